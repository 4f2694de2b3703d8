//! Supplier receipt ledger service
//!
//! Acquisition events feed the valuation engine. Recording a receipt also
//! maintains the registry: the product is created on its first receipt and
//! its stock incremented on every one, inside the same transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::{
    validate_non_negative_amount, validate_positive_quantity, validate_product_name,
    AcquisitionSummary, Receipt,
};

use crate::error::{AppError, AppResult};
use crate::services::analytics;

/// Receipt ledger service
#[derive(Clone)]
pub struct ReceiptService {
    db: PgPool,
}

/// Database row for a receipt
#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    id: Uuid,
    product_id: Uuid,
    quantity_received: Decimal,
    unit_cost: Decimal,
    total_cost: Option<Decimal>,
    supplier_id: Option<Uuid>,
    received_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<ReceiptRow> for Receipt {
    fn from(row: ReceiptRow) -> Self {
        Receipt {
            id: row.id,
            product_id: row.product_id,
            quantity_received: row.quantity_received,
            unit_cost: row.unit_cost,
            total_cost: row.total_cost,
            supplier_id: row.supplier_id,
            received_date: row.received_date,
            created_at: row.created_at,
        }
    }
}

const RECEIPT_COLUMNS: &str = "id, product_id, quantity_received, unit_cost, total_cost, \
     supplier_id, received_date, created_at";

/// Input for recording a supplier receipt
#[derive(Debug, Deserialize)]
pub struct RecordReceiptInput {
    /// Free-text product name, resolved to a product id case-insensitively;
    /// an unknown name creates the product.
    pub product_name: String,
    pub quantity_received: Decimal,
    pub unit_cost: Decimal,
    /// Falls back to `unit_cost × quantity_received` when omitted.
    pub total_cost: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub received_date: Option<NaiveDate>,
    /// Unit for a product created by this receipt.
    pub unit: Option<String>,
    /// Selling price for a product created by this receipt.
    pub selling_price: Option<Decimal>,
}

/// Filter for listing receipts
#[derive(Debug, Default, Deserialize)]
pub struct ReceiptFilter {
    pub product_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReceiptService {
    /// Create a new ReceiptService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a supplier receipt.
    ///
    /// Resolves the product name at the write boundary, creating the product
    /// on first receipt, and increments its stock in the same transaction.
    pub async fn record_receipt(&self, input: RecordReceiptInput) -> AppResult<Receipt> {
        validate_product_name(&input.product_name)
            .map_err(|msg| AppError::validation("product_name", msg))?;
        validate_positive_quantity(input.quantity_received)
            .map_err(|msg| AppError::validation("quantity_received", msg))?;
        validate_non_negative_amount(input.unit_cost)
            .map_err(|msg| AppError::validation("unit_cost", msg))?;
        if let Some(total) = input.total_cost {
            validate_non_negative_amount(total)
                .map_err(|msg| AppError::validation("total_cost", msg))?;
        }

        let name = input.product_name.trim().to_string();
        let received_date = input
            .received_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        // Resolve or create the product, adding the received quantity
        let product_id = match sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM products WHERE LOWER(name) = LOWER($1)",
        )
        .bind(&name)
        .fetch_optional(&mut *tx)
        .await?
        {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE products
                    SET current_stock = current_stock + $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(input.quantity_received)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                let unit = input.unit.clone().unwrap_or_else(|| "unit".to_string());
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    INSERT INTO products (name, unit, current_stock, selling_price)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(&name)
                .bind(&unit)
                .bind(input.quantity_received)
                .bind(input.selling_price)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let row = sqlx::query_as::<_, ReceiptRow>(&format!(
            r#"
            INSERT INTO receipts (product_id, quantity_received, unit_cost, total_cost,
                                  supplier_id, received_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            RECEIPT_COLUMNS
        ))
        .bind(product_id)
        .bind(input.quantity_received)
        .bind(input.unit_cost)
        .bind(input.total_cost)
        .bind(input.supplier_id)
        .bind(received_date)
        .fetch_one(&mut *tx)
        .await?;

        analytics::invalidate_metrics(&mut *tx, &[product_id]).await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// List receipts, newest first
    pub async fn list_receipts(&self, filter: ReceiptFilter) -> AppResult<Vec<Receipt>> {
        let start = filter
            .start_date
            .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let end = filter
            .end_date
            .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap());

        let rows = sqlx::query_as::<_, ReceiptRow>(&format!(
            r#"
            SELECT {}
            FROM receipts
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND received_date BETWEEN $2 AND $3
            ORDER BY received_date DESC, created_at DESC
            "#,
            RECEIPT_COLUMNS
        ))
        .bind(filter.product_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Acquisition aggregates for a product: units received, total invested
    /// (with the total-cost fallback), distinct suppliers, earliest receipt.
    pub async fn acquisition_summary(&self, product_id: Uuid) -> AppResult<AcquisitionSummary> {
        let row = sqlx::query_as::<_, (Decimal, Decimal, i64, Option<NaiveDate>)>(
            r#"
            SELECT COALESCE(SUM(quantity_received), 0),
                   COALESCE(SUM(COALESCE(total_cost, unit_cost * quantity_received)), 0),
                   COUNT(DISTINCT supplier_id),
                   MIN(received_date)
            FROM receipts
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(AcquisitionSummary {
            units_received: row.0,
            total_invested: row.1,
            supplier_count: row.2,
            earliest_receipt: row.3,
        })
    }
}
