//! Inventory metric formulas
//!
//! Pure arithmetic behind valuation and supply-chain reconciliation.
//! Division by zero is never an error here: every ratio has a defined
//! zero default so the metrics stay total over incomplete ledgers.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Acquisition-side aggregates for one product (Stage 1).
#[derive(Debug, Clone, Default)]
pub struct AcquisitionSummary {
    pub units_received: Decimal,
    /// Σ total_cost with the `unit_cost × quantity` fallback already applied.
    pub total_invested: Decimal,
    pub supplier_count: i64,
    pub earliest_receipt: Option<NaiveDate>,
}

/// Sales-side aggregates for one product (Stage 3), reversal-netted.
#[derive(Debug, Clone, Default)]
pub struct SalesSummary {
    pub units_sold: Decimal,
    pub revenue: Decimal,
}

/// The full per-product metric bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricBundle {
    pub units_received: Decimal,
    pub total_invested: Decimal,
    pub supplier_count: i64,
    pub units_remaining: Decimal,
    /// Days since the earliest receipt (age of the oldest batch, not a
    /// stock-weighted average).
    pub avg_inventory_age_days: i64,
    pub units_sold: Decimal,
    pub revenue: Decimal,
    pub avg_selling_price: Decimal,
    pub avg_unit_cost: Decimal,
    pub turnover_times: Decimal,
    pub turnover_rate: Decimal,
    pub cost_of_goods_sold: Decimal,
    pub profit_margin: Decimal,
    pub break_even_units: i64,
    pub status: MovementStatus,
}

/// Movement status tier, more granular than the stock health classifier
/// and computed from turnover rather than sales counts. Both exist side by
/// side as separate outputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    OutOfStock,
    LowStock,
    FastMoving,
    NormalMovement,
    SlowMoving,
    NoSalesYet,
}

impl MovementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementStatus::OutOfStock => "Out of Stock",
            MovementStatus::LowStock => "Low Stock",
            MovementStatus::FastMoving => "Fast-moving",
            MovementStatus::NormalMovement => "Normal movement",
            MovementStatus::SlowMoving => "Slow-moving",
            MovementStatus::NoSalesYet => "No sales yet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Out of Stock" => Some(MovementStatus::OutOfStock),
            "Low Stock" => Some(MovementStatus::LowStock),
            "Fast-moving" => Some(MovementStatus::FastMoving),
            "Normal movement" => Some(MovementStatus::NormalMovement),
            "Slow-moving" => Some(MovementStatus::SlowMoving),
            "No sales yet" => Some(MovementStatus::NoSalesYet),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted average unit cost: total invested over units received,
/// zero when nothing has been received.
pub fn weighted_average_unit_cost(total_invested: Decimal, units_received: Decimal) -> Decimal {
    if units_received.is_zero() {
        Decimal::ZERO
    } else {
        total_invested / units_received
    }
}

/// Stock value at the weighted average cost basis.
pub fn stock_value(current_stock: Decimal, avg_unit_cost: Decimal) -> Decimal {
    current_stock * avg_unit_cost
}

/// Sell-through velocity: units sold per unit received.
/// Zero whenever nothing has been received, regardless of sales.
pub fn turnover_times(units_sold: Decimal, units_received: Decimal) -> Decimal {
    if units_received.is_zero() {
        Decimal::ZERO
    } else {
        units_sold / units_received
    }
}

/// Profit margin percentage over revenue; zero on zero revenue.
pub fn profit_margin_percent(revenue: Decimal, cost_of_goods_sold: Decimal) -> Decimal {
    if revenue.is_zero() {
        Decimal::ZERO
    } else {
        (revenue - cost_of_goods_sold) / revenue * Decimal::ONE_HUNDRED
    }
}

/// Units that must sell at the average price to recover the investment.
/// Zero when the average selling price is zero.
pub fn break_even_units(total_invested: Decimal, avg_selling_price: Decimal) -> i64 {
    if avg_selling_price.is_zero() {
        0
    } else {
        (total_invested / avg_selling_price).ceil().to_i64().unwrap_or(0)
    }
}

/// Movement status tiering, first match wins.
pub fn classify_movement(
    units_remaining: Decimal,
    turnover: Decimal,
    low_stock_threshold: Decimal,
) -> MovementStatus {
    let fast = Decimal::new(15, 1); // 1.5
    let normal = Decimal::new(5, 1); // 0.5

    if units_remaining <= Decimal::ZERO {
        MovementStatus::OutOfStock
    } else if units_remaining < low_stock_threshold {
        MovementStatus::LowStock
    } else if turnover >= fast {
        MovementStatus::FastMoving
    } else if turnover >= normal {
        MovementStatus::NormalMovement
    } else if turnover > Decimal::ZERO {
        MovementStatus::SlowMoving
    } else {
        MovementStatus::NoSalesYet
    }
}

/// Assemble the full metric bundle from the three stage aggregates.
///
/// `as_of` anchors the inventory-age computation; `selling_price` is the
/// registry fallback when no sales exist to average over.
pub fn compute_metric_bundle(
    units_remaining: Decimal,
    selling_price: Option<Decimal>,
    acquisition: &AcquisitionSummary,
    sales: &SalesSummary,
    as_of: NaiveDate,
    low_stock_threshold: Decimal,
) -> MetricBundle {
    let avg_unit_cost =
        weighted_average_unit_cost(acquisition.total_invested, acquisition.units_received);

    let avg_inventory_age_days = acquisition
        .earliest_receipt
        .map(|d| (as_of - d).num_days().max(0))
        .unwrap_or(0);

    let avg_selling_price = if sales.units_sold > Decimal::ZERO {
        sales.revenue / sales.units_sold
    } else {
        selling_price.unwrap_or(Decimal::ZERO)
    };

    let turnover = turnover_times(sales.units_sold, acquisition.units_received);
    let cost_of_goods_sold = avg_unit_cost * sales.units_sold;

    MetricBundle {
        units_received: acquisition.units_received,
        total_invested: acquisition.total_invested,
        supplier_count: acquisition.supplier_count,
        units_remaining,
        avg_inventory_age_days,
        units_sold: sales.units_sold,
        revenue: sales.revenue,
        avg_selling_price: avg_selling_price.round_dp(2),
        avg_unit_cost: avg_unit_cost.round_dp(4),
        turnover_times: turnover.round_dp(4),
        turnover_rate: (turnover * Decimal::ONE_HUNDRED).round_dp(2),
        cost_of_goods_sold: cost_of_goods_sold.round_dp(2),
        profit_margin: profit_margin_percent(sales.revenue, cost_of_goods_sold).round_dp(2),
        break_even_units: break_even_units(acquisition.total_invested, avg_selling_price),
        status: classify_movement(units_remaining, turnover, low_stock_threshold),
    }
}
