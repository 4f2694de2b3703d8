//! Validation utilities for Shoplog
//!
//! Pure checks applied at the write boundary, before anything touches the
//! row store.

use rust_decimal::Decimal;

// ============================================================================
// Quantity and price validations
// ============================================================================

/// Validate a strictly positive quantity (receipts, sales, conversions)
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a non-negative money amount (costs, prices, expenses)
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate a signed movement quantity: zero moves nothing
pub fn validate_movement_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity.is_zero() {
        return Err("Movement quantity cannot be zero");
    }
    Ok(())
}

// ============================================================================
// Name validations
// ============================================================================

/// Validate a product name: non-empty after trimming, bounded length
pub fn validate_product_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Product name cannot be empty");
    }
    if trimmed.len() > 120 {
        return Err("Product name must be at most 120 characters");
    }
    Ok(())
}

/// Validate an expense category
pub fn validate_expense_category(category: &str) -> Result<(), &'static str> {
    if category.trim().is_empty() {
        return Err("Expense category cannot be empty");
    }
    Ok(())
}

// ============================================================================
// Conversion validations
// ============================================================================

/// Validate the shape of a stock conversion request.
///
/// Stock sufficiency is NOT checked here; that happens atomically at
/// execution time against the live product row.
pub fn validate_conversion_quantities(
    source_quantity: Decimal,
    new_quantity: Decimal,
) -> Result<(), &'static str> {
    if source_quantity <= Decimal::ZERO {
        return Err("Source quantity must be positive");
    }
    if new_quantity <= Decimal::ZERO {
        return Err("Converted quantity must be positive");
    }
    Ok(())
}

/// Guard used by the conversion transactor: the consumed quantity can never
/// exceed the stock on hand at execution time.
pub fn conversion_within_stock(
    source_stock: Decimal,
    source_quantity: Decimal,
) -> Result<(), &'static str> {
    if source_quantity > source_stock {
        return Err("Conversion quantity exceeds current stock");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn positive_quantity_accepts_fractional() {
        assert!(validate_positive_quantity(dec("0.5")).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(dec("-3")).is_err());
    }

    #[test]
    fn non_negative_amount_allows_zero() {
        assert!(validate_non_negative_amount(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(dec("-0.01")).is_err());
    }

    #[test]
    fn movement_quantity_rejects_zero_only() {
        assert!(validate_movement_quantity(dec("-5")).is_ok());
        assert!(validate_movement_quantity(dec("5")).is_ok());
        assert!(validate_movement_quantity(Decimal::ZERO).is_err());
    }

    #[test]
    fn product_name_rules() {
        assert!(validate_product_name("Palm Oil").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"x".repeat(121)).is_err());
    }

    #[test]
    fn conversion_quantity_rules() {
        assert!(validate_conversion_quantities(dec("10"), dec("8")).is_ok());
        assert!(validate_conversion_quantities(Decimal::ZERO, dec("8")).is_err());
        assert!(validate_conversion_quantities(dec("10"), Decimal::ZERO).is_err());
    }

    #[test]
    fn conversion_stock_guard() {
        assert!(conversion_within_stock(dec("10"), dec("10")).is_ok());
        assert!(conversion_within_stock(dec("10"), dec("10.001")).is_err());
    }
}
