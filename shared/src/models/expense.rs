//! Expense ledger models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded business expense. Conversion losses land here with category
/// "Stock Conversion" and a reference to the originating movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    /// Originating movement for loss expenses, when applicable.
    pub reference_id: Option<Uuid>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Expense category used for conversion losses.
pub const STOCK_CONVERSION_CATEGORY: &str = "Stock Conversion";
