//! Sales stream service
//!
//! Reversal-aware projection of completed sales. Rows are append-only;
//! a reversal flips `is_reversed` and restores the deducted stock, and the
//! reversed row contributes zero to every downstream total.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::{
    validate_non_negative_amount, validate_positive_quantity, Sale, SaleOrigin, SalesSummary,
};

use crate::error::{AppError, AppResult};
use crate::services::analytics;

/// Sales stream service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Database row for a sale
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    product_id: Uuid,
    quantity: Decimal,
    unit_price: Option<Decimal>,
    amount: Decimal,
    origin: String,
    movement_id: Option<Uuid>,
    is_reversed: bool,
    reversed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self) -> AppResult<Sale> {
        let origin = SaleOrigin::from_str(&self.origin)
            .ok_or_else(|| AppError::Internal(format!("unknown sale origin: {}", self.origin)))?;

        Ok(Sale {
            id: self.id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            amount: self.amount,
            origin,
            movement_id: self.movement_id,
            is_reversed: self.is_reversed,
            reversed_at: self.reversed_at,
            created_at: self.created_at,
        })
    }
}

const SALE_COLUMNS: &str = "id, product_id, quantity, unit_price, amount, origin, movement_id, \
     is_reversed, reversed_at, created_at";

/// Input for recording a register sale
#[derive(Debug, Deserialize)]
pub struct RecordSaleInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    /// Explicit total; falls back to `unit_price × quantity`, then to the
    /// product's selling price.
    pub amount: Option<Decimal>,
}

/// Filter for listing sales
#[derive(Debug, Default, Deserialize)]
pub struct SaleFilter {
    pub product_id: Option<Uuid>,
    pub origin: Option<SaleOrigin>,
    pub include_reversed: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale at the register.
    ///
    /// Deducts stock (clamped at zero) and stamps the product's last sale
    /// date in the same transaction.
    pub async fn record_sale(&self, input: RecordSaleInput) -> AppResult<Sale> {
        validate_positive_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        if let Some(price) = input.unit_price {
            validate_non_negative_amount(price)
                .map_err(|msg| AppError::validation("unit_price", msg))?;
        }
        if let Some(amount) = input.amount {
            validate_non_negative_amount(amount)
                .map_err(|msg| AppError::validation("amount", msg))?;
        }

        let selling_price = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT selling_price FROM products WHERE id = $1",
        )
        .bind(input.product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let unit_price = input.unit_price.or(selling_price);
        let amount = input
            .amount
            .or(unit_price.map(|price| price * input.quantity))
            .unwrap_or(Decimal::ZERO);

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            INSERT INTO sales (product_id, quantity, unit_price, amount, origin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(unit_price)
        .bind(amount)
        .bind(SaleOrigin::Register.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = GREATEST(current_stock - $2, 0),
                last_sale_date = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(input.product_id)
        .bind(input.quantity)
        .execute(&mut *tx)
        .await?;

        analytics::invalidate_metrics(&mut *tx, &[input.product_id]).await?;

        tx.commit().await?;

        row.into_sale()
    }

    /// Reverse a sale: the row stays in the stream but contributes zero to
    /// effective totals, and the deducted stock is restored.
    pub async fn reverse_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        let existing = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales WHERE id = $1",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        if existing.is_reversed {
            return Err(AppError::validation("sale_id", "Sale is already reversed"));
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            UPDATE sales
            SET is_reversed = TRUE, reversed_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(existing.product_id)
        .bind(existing.quantity)
        .execute(&mut *tx)
        .await?;

        analytics::invalidate_metrics(&mut *tx, &[existing.product_id]).await?;

        tx.commit().await?;

        row.into_sale()
    }

    /// List sales, newest first. Reversed rows are hidden unless asked for.
    pub async fn list_sales(&self, filter: SaleFilter) -> AppResult<Vec<Sale>> {
        let start = filter
            .start_date
            .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let end = filter
            .end_date
            .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap());
        let include_reversed = filter.include_reversed.unwrap_or(false);

        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            SELECT {}
            FROM sales
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::varchar IS NULL OR origin = $2)
              AND ($3 OR is_reversed = FALSE)
              AND created_at::date BETWEEN $4 AND $5
            ORDER BY created_at DESC
            "#,
            SALE_COLUMNS
        ))
        .bind(filter.product_id)
        .bind(filter.origin.map(|o| o.as_str()))
        .bind(include_reversed)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(|r| r.into_sale()).collect()
    }

    /// Effective totals for a product: reversal-netted units and revenue
    /// over the whole stream, both origins included.
    pub async fn effective_totals(&self, product_id: Uuid) -> AppResult<SalesSummary> {
        let row = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT COALESCE(SUM(quantity), 0), COALESCE(SUM(amount), 0)
            FROM sales
            WHERE product_id = $1 AND is_reversed = FALSE
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(SalesSummary {
            units_sold: row.0,
            revenue: row.1,
        })
    }
}
