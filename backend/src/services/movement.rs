//! Stock movement ledger service
//!
//! Generic signed stock events: sold, damaged, expired, theft, spoiled,
//! adjusted. Conversion movements are written only by the conversion
//! service. A `sold` movement appends its origin-tagged row to the sales
//! stream in the same transaction, so every sale is counted exactly once
//! downstream.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::{
    validate_movement_quantity, ConversionDetail, MovementType, SaleOrigin, StockMovement,
};

use crate::error::{AppError, AppResult};
use crate::services::analytics;

/// Movement ledger service
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

/// Database row for a stock movement
#[derive(Debug, sqlx::FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    movement_type: String,
    quantity: Decimal,
    unit_price: Option<Decimal>,
    notes: Option<String>,
    conversion: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl MovementRow {
    fn into_movement(self) -> AppResult<StockMovement> {
        let movement_type = MovementType::from_str(&self.movement_type).ok_or_else(|| {
            AppError::Internal(format!("unknown movement type: {}", self.movement_type))
        })?;

        Ok(StockMovement {
            id: self.id,
            product_id: self.product_id,
            movement_type,
            quantity: self.quantity,
            unit_price: self.unit_price,
            notes: self.notes,
            conversion: self.conversion.and_then(ConversionDetail::from_value),
            created_at: self.created_at,
        })
    }
}

pub(crate) const MOVEMENT_COLUMNS: &str =
    "id, product_id, movement_type, quantity, unit_price, notes, conversion, created_at";

/// Input for recording a stock movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    /// Signed quantity; removal types must be negative.
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Filter for listing movements
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a stock movement and apply it to the registry.
    ///
    /// Deductions clamp at zero stock. Sold movements also append the
    /// matching sale row (origin `stock_movement`) and stamp the product's
    /// last sale date.
    pub async fn record_movement(&self, input: RecordMovementInput) -> AppResult<StockMovement> {
        if input.movement_type == MovementType::Conversion {
            return Err(AppError::validation(
                "movement_type",
                "Conversion movements are recorded by the stock conversion operation",
            ));
        }
        validate_movement_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        if input.movement_type.is_removal() && input.quantity > Decimal::ZERO {
            return Err(AppError::validation(
                "quantity",
                "Removal movements must carry a negative quantity",
            ));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(input.product_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let mut tx = self.db.begin().await?;

        // Apply to the registry, clamped so stock never goes negative
        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = GREATEST(current_stock + $2, 0), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(input.product_id)
        .bind(input.quantity)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            INSERT INTO stock_movements (product_id, movement_type, quantity, unit_price, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(input.product_id)
        .bind(input.movement_type.as_str())
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        if input.movement_type == MovementType::Sold {
            let sold_quantity = input.quantity.abs();
            let amount = input
                .unit_price
                .map(|price| price * sold_quantity)
                .unwrap_or(Decimal::ZERO);

            sqlx::query(
                r#"
                INSERT INTO sales (product_id, quantity, unit_price, amount, origin, movement_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(input.product_id)
            .bind(sold_quantity)
            .bind(input.unit_price)
            .bind(amount)
            .bind(SaleOrigin::StockMovement.as_str())
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE products SET last_sale_date = NOW() WHERE id = $1")
                .bind(input.product_id)
                .execute(&mut *tx)
                .await?;
        }

        analytics::invalidate_metrics(&mut *tx, &[input.product_id]).await?;

        tx.commit().await?;

        row.into_movement()
    }

    /// List movements, newest first
    pub async fn list_movements(&self, filter: MovementFilter) -> AppResult<Vec<StockMovement>> {
        let start = filter
            .start_date
            .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let end = filter
            .end_date
            .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap());

        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {}
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::varchar IS NULL OR movement_type = $2)
              AND created_at::date BETWEEN $3 AND $4
            ORDER BY created_at DESC
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(filter.product_id)
        .bind(filter.movement_type.map(|t| t.as_str()))
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(|r| r.into_movement()).collect()
    }
}
