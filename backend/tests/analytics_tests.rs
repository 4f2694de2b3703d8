//! Reconciliation engine tests
//!
//! Derived metrics (turnover, margin, break-even), the movement status
//! tiering, and reversal netting on the sales stream.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    break_even_units, classify_movement, compute_metric_bundle, profit_margin_percent,
    turnover_times, AcquisitionSummary, MovementStatus, Sale, SaleOrigin, SalesSummary,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sale(quantity: &str, amount: &str, reversed: bool) -> Sale {
    Sale {
        id: uuid::Uuid::new_v4(),
        product_id: uuid::Uuid::new_v4(),
        quantity: dec(quantity),
        unit_price: None,
        amount: dec(amount),
        origin: SaleOrigin::Register,
        movement_id: None,
        is_reversed: reversed,
        reversed_at: None,
        created_at: chrono::Utc::now(),
    }
}

fn acquisition(units: &str, invested: &str) -> AcquisitionSummary {
    AcquisitionSummary {
        units_received: dec(units),
        total_invested: dec(invested),
        supplier_count: 1,
        earliest_receipt: NaiveDate::from_ymd_opt(2024, 1, 1),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Break-even rounds up to whole units
    #[test]
    fn test_break_even_example() {
        assert_eq!(break_even_units(dec("1000"), dec("12.5")), 80);
        assert_eq!(break_even_units(dec("1000.01"), dec("12.5")), 81);
    }

    /// Break-even defaults to zero without a selling price
    #[test]
    fn test_break_even_zero_price() {
        assert_eq!(break_even_units(dec("1000"), Decimal::ZERO), 0);
    }

    /// Turnover is zero without receipts, whatever was sold
    #[test]
    fn test_turnover_requires_receipts() {
        assert_eq!(turnover_times(dec("500"), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(turnover_times(dec("75"), dec("50")), dec("1.5"));
        assert_eq!(turnover_times(dec("25"), dec("50")), dec("0.5"));
    }

    /// Margin is zero on zero revenue, never a division error
    #[test]
    fn test_margin_defaults() {
        assert_eq!(
            profit_margin_percent(Decimal::ZERO, dec("400")),
            Decimal::ZERO
        );
        assert_eq!(profit_margin_percent(dec("200"), dec("150")), dec("25"));
        // Selling below cost goes negative rather than clamping
        assert_eq!(profit_margin_percent(dec("100"), dec("150")), dec("-50"));
    }

    /// The six movement tiers in priority order
    #[test]
    fn test_movement_tier_ordering() {
        let low = Decimal::from(5);
        assert_eq!(
            classify_movement(Decimal::ZERO, dec("3"), low),
            MovementStatus::OutOfStock
        );
        assert_eq!(
            classify_movement(dec("4"), dec("3"), low),
            MovementStatus::LowStock
        );
        assert_eq!(
            classify_movement(dec("50"), dec("1.5"), low),
            MovementStatus::FastMoving
        );
        assert_eq!(
            classify_movement(dec("50"), dec("1.49"), low),
            MovementStatus::NormalMovement
        );
        assert_eq!(
            classify_movement(dec("50"), dec("0.49"), low),
            MovementStatus::SlowMoving
        );
        assert_eq!(
            classify_movement(dec("50"), Decimal::ZERO, low),
            MovementStatus::NoSalesYet
        );
    }

    /// Reversed sales contribute zero to effective totals
    #[test]
    fn test_reversal_netting() {
        let stream = [
            sale("10", "120", false),
            sale("5", "60", true),
            sale("3", "36", false),
        ];

        let units: Decimal = stream.iter().map(|s| s.effective_quantity()).sum();
        let revenue: Decimal = stream.iter().map(|s| s.effective_amount()).sum();

        assert_eq!(units, dec("13"));
        assert_eq!(revenue, dec("156"));
    }

    /// Full bundle over a realistic ledger
    #[test]
    fn test_bundle_end_to_end() {
        let acq = acquisition("100", "1000");
        let sales = SalesSummary {
            units_sold: dec("60"),
            revenue: dec("900"),
        };

        let bundle = compute_metric_bundle(
            dec("40"),
            Some(dec("15")),
            &acq,
            &sales,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Decimal::from(5),
        );

        assert_eq!(bundle.avg_unit_cost, dec("10.0000"));
        assert_eq!(bundle.avg_selling_price, dec("15.00"));
        assert_eq!(bundle.turnover_times, dec("0.6000"));
        assert_eq!(bundle.turnover_rate, dec("60.00"));
        assert_eq!(bundle.cost_of_goods_sold, dec("600.00"));
        // (900 - 600) / 900 × 100
        assert_eq!(bundle.profit_margin, dec("33.33"));
        // ceil(1000 / 15)
        assert_eq!(bundle.break_even_units, 67);
        assert_eq!(bundle.status, MovementStatus::NormalMovement);
        // Days since the earliest receipt: Jan 1 to Mar 1 2024 (leap year)
        assert_eq!(bundle.avg_inventory_age_days, 60);
    }

    /// Inventory age is anchored to the oldest batch, not stock-weighted
    #[test]
    fn test_inventory_age_oldest_batch() {
        let mut acq = acquisition("10", "100");
        acq.earliest_receipt = NaiveDate::from_ymd_opt(2024, 1, 1);

        let bundle = compute_metric_bundle(
            dec("10"),
            None,
            &acq,
            &SalesSummary::default(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            Decimal::from(5),
        );
        assert_eq!(bundle.avg_inventory_age_days, 30);

        // No receipts at all: age is zero
        let empty = AcquisitionSummary::default();
        let bundle = compute_metric_bundle(
            Decimal::ZERO,
            None,
            &empty,
            &SalesSummary::default(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            Decimal::from(5),
        );
        assert_eq!(bundle.avg_inventory_age_days, 0);
    }

    /// Without sales the registry price feeds the average selling price
    #[test]
    fn test_selling_price_fallback() {
        let bundle = compute_metric_bundle(
            dec("80"),
            Some(dec("12.5")),
            &acquisition("80", "1000"),
            &SalesSummary::default(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            Decimal::from(5),
        );

        assert_eq!(bundle.avg_selling_price, dec("12.50"));
        assert_eq!(bundle.break_even_units, 80);
        assert_eq!(bundle.status, MovementStatus::NoSalesYet);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn money_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Turnover is zero whenever units received is zero
        #[test]
        fn prop_turnover_zero_without_receipts(sold in quantity_strategy()) {
            prop_assert_eq!(turnover_times(sold, Decimal::ZERO), Decimal::ZERO);
        }

        /// Break-even never undershoots the investment
        #[test]
        fn prop_break_even_covers_investment(
            invested in money_strategy(),
            price in money_strategy()
        ) {
            let units = break_even_units(invested, price);
            prop_assert!(Decimal::from(units) * price >= invested);
            // And one unit fewer would not cover it
            if units > 0 {
                prop_assert!(Decimal::from(units - 1) * price < invested);
            }
        }

        /// The bundle's status is always one of the six tiers
        #[test]
        fn prop_movement_status_total(
            remaining in (0i64..=10000i64).prop_map(|n| Decimal::new(n, 1)),
            turnover in (0i64..=500i64).prop_map(|n| Decimal::new(n, 2))
        ) {
            let status = classify_movement(remaining, turnover, Decimal::from(5));
            prop_assert!(matches!(
                status,
                MovementStatus::OutOfStock
                    | MovementStatus::LowStock
                    | MovementStatus::FastMoving
                    | MovementStatus::NormalMovement
                    | MovementStatus::SlowMoving
                    | MovementStatus::NoSalesYet
            ));
        }

        /// Reversing any subset of sales only ever shrinks effective totals
        #[test]
        fn prop_reversal_monotone(
            quantities in prop::collection::vec(quantity_strategy(), 1..15),
            reversed_mask in prop::collection::vec(any::<bool>(), 1..15)
        ) {
            let len = quantities.len().min(reversed_mask.len());

            let all_live: Decimal = quantities[..len].iter().sum();
            let netted: Decimal = quantities[..len]
                .iter()
                .zip(&reversed_mask[..len])
                .filter(|(_, reversed)| !**reversed)
                .map(|(q, _)| *q)
                .sum();

            prop_assert!(netted <= all_live);
        }
    }
}
