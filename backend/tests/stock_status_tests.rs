//! Stock status classifier tests
//!
//! The classifier must be total and deterministic: every
//! (current_stock, sales count) pair maps to exactly one tier, evaluated
//! top to bottom.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{classify_stock, StockPolicy, StockStatus};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn policy() -> StockPolicy {
    StockPolicy::default()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Zero stock is out of stock no matter the sales history
    #[test]
    fn test_out_of_stock_ignores_sales() {
        assert_eq!(classify_stock(Decimal::ZERO, 0, &policy()), StockStatus::Out);
        assert_eq!(
            classify_stock(Decimal::ZERO, 1000, &policy()),
            StockStatus::Out
        );
    }

    /// Below five units is low stock, even with steady sales
    #[test]
    fn test_low_stock_threshold() {
        assert_eq!(classify_stock(dec("4.9"), 12, &policy()), StockStatus::Low);
        assert_eq!(classify_stock(dec("1"), 0, &policy()), StockStatus::Low);
        // At the threshold the product is no longer low
        assert_eq!(
            classify_stock(dec("5"), 3, &policy()),
            StockStatus::Healthy
        );
    }

    /// Overstocked with no recent sales is slow-moving
    #[test]
    fn test_slow_moving() {
        assert_eq!(classify_stock(dec("21"), 0, &policy()), StockStatus::Slow);
        // A single sale in the window keeps it healthy
        assert_eq!(
            classify_stock(dec("21"), 1, &policy()),
            StockStatus::Healthy
        );
        // Exactly at the overstock threshold is not slow
        assert_eq!(
            classify_stock(dec("20"), 0, &policy()),
            StockStatus::Healthy
        );
    }

    /// Ordering: low stock wins over slow-moving
    #[test]
    fn test_low_wins_over_slow() {
        let tight = StockPolicy {
            low_stock_threshold: Decimal::from(50),
            overstock_threshold: Decimal::from(20),
            sales_window_days: 30,
        };
        // 30 units: below low threshold AND above overstock with no sales
        assert_eq!(classify_stock(dec("30"), 0, &tight), StockStatus::Low);
    }

    /// Custom thresholds are honored
    #[test]
    fn test_custom_policy() {
        let relaxed = StockPolicy {
            low_stock_threshold: Decimal::from(2),
            overstock_threshold: Decimal::from(100),
            sales_window_days: 30,
        };
        assert_eq!(classify_stock(dec("3"), 0, &relaxed), StockStatus::Healthy);
        assert_eq!(classify_stock(dec("101"), 0, &relaxed), StockStatus::Slow);
    }

    /// Tier hints surface the operator guidance
    #[test]
    fn test_hints() {
        assert_eq!(StockStatus::Out.hint(), Some("reorder immediately"));
        assert_eq!(StockStatus::Slow.hint(), Some("consider promotion"));
        assert_eq!(StockStatus::Low.hint(), None);
        assert_eq!(StockStatus::Healthy.hint(), None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn stock_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100000i64).prop_map(|n| Decimal::new(n, 2)) // 0.00 to 1000.00
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Total: every input pair maps to one of the four tiers
        #[test]
        fn prop_classifier_total(
            stock in stock_strategy(),
            sales in 0i64..10000
        ) {
            let status = classify_stock(stock, sales, &policy());
            prop_assert!(matches!(
                status,
                StockStatus::Healthy | StockStatus::Low | StockStatus::Out | StockStatus::Slow
            ));
        }

        /// Deterministic: the same input always yields the same tier
        #[test]
        fn prop_classifier_deterministic(
            stock in stock_strategy(),
            sales in 0i64..10000
        ) {
            let first = classify_stock(stock, sales, &policy());
            let second = classify_stock(stock, sales, &policy());
            prop_assert_eq!(first, second);
        }

        /// First-match ordering: zero stock is always Out
        #[test]
        fn prop_zero_stock_always_out(sales in 0i64..10000) {
            prop_assert_eq!(
                classify_stock(Decimal::ZERO, sales, &policy()),
                StockStatus::Out
            );
        }

        /// Positive stock below the low threshold is always Low
        #[test]
        fn prop_below_threshold_always_low(
            cents in 1i64..500, // 0.01 to 4.99
            sales in 0i64..10000
        ) {
            let stock = Decimal::new(cents, 2);
            prop_assert_eq!(
                classify_stock(stock, sales, &policy()),
                StockStatus::Low
            );
        }

        /// Slow requires both overstock and zero sales
        #[test]
        fn prop_slow_requires_no_sales(
            stock in (2001i64..=100000i64).prop_map(|n| Decimal::new(n, 2)),
            sales in 1i64..10000
        ) {
            prop_assert_eq!(
                classify_stock(stock, sales, &policy()),
                StockStatus::Healthy
            );
        }
    }
}
