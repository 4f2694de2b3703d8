//! Product registry models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product tracked in the registry
///
/// Created on first supplier receipt or explicit registration. Names are
/// unique case-insensitively; `current_stock` never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Unit of measure for stock quantities (e.g. "kg", "bottle")
    pub unit: String,
    pub current_stock: Decimal,
    pub selling_price: Option<Decimal>,
    pub last_sale_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Case-insensitive name comparison used when matching ledger input
    /// to an existing product at the write boundary.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
