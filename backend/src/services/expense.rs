//! Expense ledger service
//!
//! Sink for conversion losses and general business expenses.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::{validate_expense_category, validate_non_negative_amount, Expense};

use crate::error::{AppError, AppResult};

/// Expense ledger service
#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

/// Database row for an expense
#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: Uuid,
    amount: Decimal,
    category: String,
    description: Option<String>,
    reference_id: Option<Uuid>,
    expense_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: row.id,
            amount: row.amount,
            category: row.category,
            description: row.description,
            reference_id: row.reference_id,
            expense_date: row.expense_date,
            created_at: row.created_at,
        }
    }
}

const EXPENSE_COLUMNS: &str =
    "id, amount, category, description, reference_id, expense_date, created_at";

/// Input for recording an expense
#[derive(Debug, Deserialize)]
pub struct RecordExpenseInput {
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub reference_id: Option<Uuid>,
    pub expense_date: Option<NaiveDate>,
}

/// Filter for listing expenses
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Aggregate per expense category
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CategoryTotal {
    pub category: String,
    pub total_amount: Decimal,
    pub entry_count: i64,
}

impl ExpenseService {
    /// Create a new ExpenseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record an expense
    pub async fn record_expense(&self, input: RecordExpenseInput) -> AppResult<Expense> {
        validate_non_negative_amount(input.amount)
            .map_err(|msg| AppError::validation("amount", msg))?;
        validate_expense_category(&input.category)
            .map_err(|msg| AppError::validation("category", msg))?;

        let expense_date = input
            .expense_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            INSERT INTO expenses (amount, category, description, reference_id, expense_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        ))
        .bind(input.amount)
        .bind(input.category.trim())
        .bind(&input.description)
        .bind(input.reference_id)
        .bind(expense_date)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List expenses, newest first
    pub async fn list_expenses(&self, filter: ExpenseFilter) -> AppResult<Vec<Expense>> {
        let start = filter
            .start_date
            .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let end = filter
            .end_date
            .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap());

        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            SELECT {}
            FROM expenses
            WHERE ($1::text IS NULL OR category = $1)
              AND expense_date BETWEEN $2 AND $3
            ORDER BY expense_date DESC, created_at DESC
            "#,
            EXPENSE_COLUMNS
        ))
        .bind(&filter.category)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Expense totals grouped by category over a date range
    pub async fn totals_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<CategoryTotal>> {
        let rows = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category,
                   COALESCE(SUM(amount), 0) AS total_amount,
                   COUNT(*) AS entry_count
            FROM expenses
            WHERE expense_date BETWEEN $1 AND $2
            GROUP BY category
            ORDER BY total_amount DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
