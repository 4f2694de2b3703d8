//! Stock status classifier
//!
//! Simple health tiering from current stock and recent sales velocity.
//! Total and deterministic: every (stock, sales count) pair maps to exactly
//! one status, evaluated top to bottom with first match winning.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Policy thresholds for stock health classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPolicy {
    /// Below this, a product is low on stock.
    pub low_stock_threshold: Decimal,
    /// Above this with no recent sales, a product is slow-moving.
    pub overstock_threshold: Decimal,
    /// Trailing window, in days, for the sales velocity signal.
    pub sales_window_days: i64,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            low_stock_threshold: Decimal::from(5),
            overstock_threshold: Decimal::from(20),
            sales_window_days: 30,
        }
    }
}

/// Stock health tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Healthy,
    Low,
    Out,
    Slow,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Healthy => "healthy",
            StockStatus::Low => "low",
            StockStatus::Out => "out",
            StockStatus::Slow => "slow",
        }
    }

    /// Operator-facing hint attached to the actionable tiers.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            StockStatus::Out => Some("reorder immediately"),
            StockStatus::Slow => Some("consider promotion"),
            _ => None,
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a product's stock health.
///
/// Ordering matters: out-of-stock wins over everything, low stock wins over
/// slow-moving.
pub fn classify_stock(
    current_stock: Decimal,
    sales_count_30d: i64,
    policy: &StockPolicy,
) -> StockStatus {
    if current_stock <= Decimal::ZERO {
        StockStatus::Out
    } else if current_stock < policy.low_stock_threshold {
        StockStatus::Low
    } else if sales_count_30d == 0 && current_stock > policy.overstock_threshold {
        StockStatus::Slow
    } else {
        StockStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> StockPolicy {
        StockPolicy::default()
    }

    #[test]
    fn out_of_stock_wins_regardless_of_sales() {
        assert_eq!(
            classify_stock(Decimal::ZERO, 0, &policy()),
            StockStatus::Out
        );
        assert_eq!(
            classify_stock(Decimal::ZERO, 500, &policy()),
            StockStatus::Out
        );
    }

    #[test]
    fn low_stock_below_threshold() {
        assert_eq!(classify_stock(Decimal::from(4), 10, &policy()), StockStatus::Low);
        assert_eq!(classify_stock(Decimal::from(1), 0, &policy()), StockStatus::Low);
    }

    #[test]
    fn slow_requires_no_sales_and_overstock() {
        assert_eq!(classify_stock(Decimal::from(21), 0, &policy()), StockStatus::Slow);
        // Any recent sale keeps an overstocked product healthy
        assert_eq!(
            classify_stock(Decimal::from(21), 1, &policy()),
            StockStatus::Healthy
        );
        // At the boundary it is not overstocked
        assert_eq!(
            classify_stock(Decimal::from(20), 0, &policy()),
            StockStatus::Healthy
        );
    }

    #[test]
    fn healthy_otherwise() {
        assert_eq!(classify_stock(Decimal::from(10), 3, &policy()), StockStatus::Healthy);
    }

    #[test]
    fn hints_on_actionable_tiers() {
        assert_eq!(StockStatus::Out.hint(), Some("reorder immediately"));
        assert_eq!(StockStatus::Slow.hint(), Some("consider promotion"));
        assert_eq!(StockStatus::Healthy.hint(), None);
    }
}
