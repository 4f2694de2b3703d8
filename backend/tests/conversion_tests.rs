//! Stock conversion tests
//!
//! The conversion guard, cost-basis transfer arithmetic, and the loss
//! expense a caller can opt into after seeing the cost impact.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{
    conversion_within_stock, validate_conversion_quantities, weighted_average_unit_cost,
    ConversionDetail, STOCK_CONVERSION_CATEGORY,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Simulation Helpers
// ============================================================================

/// Outcome of a simulated conversion over in-memory stock levels
#[derive(Debug, PartialEq)]
struct ConversionOutcome {
    source_stock: Decimal,
    destination_stock: Decimal,
    loss_expense: Option<Decimal>,
}

/// Simulate the conversion transactor against plain stock numbers: the
/// same preconditions, decrement, upsert and optional loss booking the
/// service runs in its transaction.
fn simulate_conversion(
    source_stock: Decimal,
    source_avg_cost: Decimal,
    destination_stock: Option<Decimal>,
    quantity: Decimal,
    new_quantity: Decimal,
    record_loss: bool,
) -> Result<ConversionOutcome, &'static str> {
    validate_conversion_quantities(quantity, new_quantity)?;
    conversion_within_stock(source_stock, quantity)?;

    Ok(ConversionOutcome {
        source_stock: source_stock - quantity,
        destination_stock: destination_stock.unwrap_or(Decimal::ZERO) + new_quantity,
        loss_expense: record_loss.then(|| source_avg_cost * quantity),
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 10 palm fruit at avg cost 5 into 8 palm oil, loss recorded
    #[test]
    fn test_palm_fruit_to_palm_oil() {
        let outcome = simulate_conversion(
            dec("25"),  // palm fruit on hand
            dec("5"),   // avg unit cost
            Some(dec("2")), // existing palm oil stock
            dec("10"),
            dec("8"),
            true,
        )
        .unwrap();

        assert_eq!(outcome.source_stock, dec("15"));
        assert_eq!(outcome.destination_stock, dec("10"));
        assert_eq!(outcome.loss_expense, Some(dec("50")));
        assert_eq!(STOCK_CONVERSION_CATEGORY, "Stock Conversion");
    }

    /// Converting into a product that does not exist yet starts from zero
    #[test]
    fn test_new_destination_product() {
        let outcome =
            simulate_conversion(dec("10"), dec("5"), None, dec("10"), dec("8"), false).unwrap();

        assert_eq!(outcome.source_stock, Decimal::ZERO);
        assert_eq!(outcome.destination_stock, dec("8"));
        assert_eq!(outcome.loss_expense, None);
    }

    /// Requesting more than the stock on hand fails before any mutation
    #[test]
    fn test_oversized_conversion_rejected() {
        let result = simulate_conversion(
            dec("10"),
            dec("5"),
            Some(dec("2")),
            dec("10.001"),
            dec("8"),
            true,
        );
        assert!(result.is_err());
    }

    /// Zero and negative quantities are rejected up front
    #[test]
    fn test_degenerate_quantities_rejected() {
        assert!(simulate_conversion(dec("10"), dec("5"), None, Decimal::ZERO, dec("8"), false)
            .is_err());
        assert!(simulate_conversion(dec("10"), dec("5"), None, dec("5"), Decimal::ZERO, false)
            .is_err());
        assert!(simulate_conversion(dec("10"), dec("5"), None, dec("-1"), dec("8"), false)
            .is_err());
    }

    /// A source with no receipts converts at a zero cost basis
    #[test]
    fn test_zero_cost_basis() {
        let avg = weighted_average_unit_cost(Decimal::ZERO, Decimal::ZERO);
        let outcome =
            simulate_conversion(dec("10"), avg, None, dec("4"), dec("3"), true).unwrap();
        assert_eq!(outcome.loss_expense, Some(Decimal::ZERO));
    }

    /// Lineage detail survives the JSON round trip used by the ledger
    #[test]
    fn test_conversion_detail_round_trip() {
        let detail = ConversionDetail {
            original_product: "Palm Fruit".to_string(),
            converted_product: "Palm Oil".to_string(),
            original_quantity: dec("10"),
            new_quantity: dec("8"),
            unit: Some("litre".to_string()),
        };

        let value = detail.to_value();
        let parsed = ConversionDetail::from_value(value).unwrap();
        assert_eq!(parsed, detail);
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

    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// After a successful conversion: source −Q, destination +N
        #[test]
        fn prop_conversion_moves_exact_quantities(
            headroom in quantity_strategy(),
            quantity in quantity_strategy(),
            new_quantity in quantity_strategy(),
            existing in quantity_strategy()
        ) {
            let source_stock = quantity + headroom;
            let outcome = simulate_conversion(
                source_stock,
                dec("5"),
                Some(existing),
                quantity,
                new_quantity,
                false,
            ).unwrap();

            prop_assert_eq!(outcome.source_stock, source_stock - quantity);
            prop_assert_eq!(outcome.destination_stock, existing + new_quantity);
        }

        /// Oversized requests always fail, leaving nothing to apply
        #[test]
        fn prop_oversized_always_fails(
            stock in quantity_strategy(),
            excess in quantity_strategy(),
            new_quantity in quantity_strategy()
        ) {
            let result = simulate_conversion(
                stock,
                dec("5"),
                None,
                stock + excess,
                new_quantity,
                true,
            );
            prop_assert!(result.is_err());
        }

        /// The booked loss is exactly avg cost × quantity
        #[test]
        fn prop_loss_matches_cost_impact(
            quantity in quantity_strategy(),
            avg_cost in cost_strategy()
        ) {
            let outcome = simulate_conversion(
                quantity,
                avg_cost,
                None,
                quantity,
                dec("1"),
                true,
            ).unwrap();

            prop_assert_eq!(outcome.loss_expense, Some(avg_cost * quantity));
        }

        /// Converting the full stock drains the source to exactly zero
        #[test]
        fn prop_full_conversion_drains_source(
            stock in quantity_strategy(),
            new_quantity in quantity_strategy()
        ) {
            let outcome = simulate_conversion(
                stock,
                dec("5"),
                None,
                stock,
                new_quantity,
                false,
            ).unwrap();
            prop_assert_eq!(outcome.source_stock, Decimal::ZERO);
        }
    }
}
