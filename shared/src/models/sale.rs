//! Sales stream models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed sale in the append-only sales stream.
///
/// Every sale carries exactly one origin: recorded at the register, or
/// derived from a `sold` stock movement (in which case `movement_id` links
/// back to it). Reversed sales contribute zero to all downstream totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub amount: Decimal,
    pub origin: SaleOrigin,
    pub movement_id: Option<Uuid>,
    pub is_reversed: bool,
    pub reversed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Quantity after reversal netting.
    pub fn effective_quantity(&self) -> Decimal {
        if self.is_reversed {
            Decimal::ZERO
        } else {
            self.quantity
        }
    }

    /// Amount after reversal netting.
    pub fn effective_amount(&self) -> Decimal {
        if self.is_reversed {
            Decimal::ZERO
        } else {
            self.amount
        }
    }
}

/// Where a sale was recorded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaleOrigin {
    Register,
    StockMovement,
}

impl SaleOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleOrigin::Register => "register",
            SaleOrigin::StockMovement => "stock_movement",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "register" => Some(SaleOrigin::Register),
            "stock_movement" => Some(SaleOrigin::StockMovement),
            _ => None,
        }
    }
}
