//! Supplier receipt models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An acquisition event from a supplier. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity_received: Decimal,
    pub unit_cost: Decimal,
    /// Total acquisition cost; falls back to `unit_cost × quantity_received`
    /// when not recorded.
    pub total_cost: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub received_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    /// Effective total cost with the unit-cost fallback applied.
    pub fn effective_total_cost(&self) -> Decimal {
        self.total_cost
            .unwrap_or(self.unit_cost * self.quantity_received)
    }
}
