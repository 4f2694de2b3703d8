//! Stock movement models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generic signed stock event. Immutable once written; corrections are
/// recorded as new events, never edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: MovementType,
    /// Signed quantity; negative values remove stock.
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
    /// Lineage detail present only on `conversion` movements.
    pub conversion: Option<ConversionDetail>,
    pub created_at: DateTime<Utc>,
}

/// Types of stock movements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Sold,
    Damaged,
    Expired,
    Theft,
    Spoiled,
    Adjusted,
    Conversion,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sold => "sold",
            MovementType::Damaged => "damaged",
            MovementType::Expired => "expired",
            MovementType::Theft => "theft",
            MovementType::Spoiled => "spoiled",
            MovementType::Adjusted => "adjusted",
            MovementType::Conversion => "conversion",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sold" => Some(MovementType::Sold),
            "damaged" => Some(MovementType::Damaged),
            "expired" => Some(MovementType::Expired),
            "theft" => Some(MovementType::Theft),
            "spoiled" => Some(MovementType::Spoiled),
            "adjusted" => Some(MovementType::Adjusted),
            "conversion" => Some(MovementType::Conversion),
            _ => None,
        }
    }

    /// Types that always remove stock and must carry a negative quantity.
    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            MovementType::Sold
                | MovementType::Damaged
                | MovementType::Expired
                | MovementType::Theft
                | MovementType::Spoiled
        )
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured lineage recorded with a conversion movement: the audit trail
/// linking consumed source stock to the produced destination stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionDetail {
    pub original_product: String,
    pub converted_product: String,
    pub original_quantity: Decimal,
    pub new_quantity: Decimal,
    pub unit: Option<String>,
}

impl ConversionDetail {
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}
