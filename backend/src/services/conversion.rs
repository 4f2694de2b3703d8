//! Stock conversion service
//!
//! Transforms Q units of a source product into N units of a destination
//! product (possibly new), transferring cost basis and optionally booking
//! the consumed value as a loss expense. Callers first `propose` to see the
//! cost impact, then `execute`; execution is a single transaction whose
//! first statement is a conditional decrement, so an oversized request or a
//! mid-sequence failure leaves no partial state behind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::{
    validate_conversion_quantities, validate_non_negative_amount, validate_product_name,
    ConversionDetail, MovementType, STOCK_CONVERSION_CATEGORY,
};

use crate::error::{AppError, AppResult};
use crate::services::analytics;
use crate::services::valuation::ValuationService;

/// Stock conversion service
#[derive(Clone)]
pub struct ConversionService {
    db: PgPool,
}

/// Input shared by propose and execute
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionInput {
    pub source_product_id: Uuid,
    /// Quantity of the source consumed
    pub quantity: Decimal,
    /// Destination product, matched case-insensitively; created if unknown
    pub destination_name: String,
    /// Quantity of the destination produced
    pub new_quantity: Decimal,
    /// Unit for a destination created by this conversion
    pub unit: Option<String>,
    /// Forward cost basis per destination unit; 0 when omitted
    pub destination_unit_cost: Option<Decimal>,
    pub destination_selling_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for executing a conversion
#[derive(Debug, Deserialize)]
pub struct ExecuteConversionInput {
    #[serde(flatten)]
    pub conversion: ConversionInput,
    /// Book the consumed value as a "Stock Conversion" expense
    pub record_loss: bool,
}

/// Read-only preview of a conversion's cost impact
#[derive(Debug, Serialize)]
pub struct ConversionProposal {
    pub source_product_id: Uuid,
    pub source_name: String,
    pub source_current_stock: Decimal,
    pub quantity: Decimal,
    /// Fresh weighted average unit cost of the source
    pub source_avg_unit_cost: Decimal,
    /// Value consumed: avg unit cost × quantity. Booked as an expense when
    /// the caller confirms with `record_loss`.
    pub cost_impact: Decimal,
    pub destination_name: String,
    pub destination_exists: bool,
    pub new_quantity: Decimal,
}

/// Result of an executed conversion
#[derive(Debug, Serialize)]
pub struct ConversionResult {
    pub movement_id: Uuid,
    pub source_product_id: Uuid,
    pub source_stock_after: Decimal,
    pub destination_product_id: Uuid,
    pub destination_name: String,
    pub destination_stock_after: Decimal,
    pub cost_impact: Decimal,
    pub expense_id: Option<Uuid>,
}

impl ConversionService {
    /// Create a new ConversionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn validate(input: &ConversionInput) -> AppResult<()> {
        validate_conversion_quantities(input.quantity, input.new_quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        validate_product_name(&input.destination_name)
            .map_err(|msg| AppError::validation("destination_name", msg))?;
        if let Some(cost) = input.destination_unit_cost {
            validate_non_negative_amount(cost)
                .map_err(|msg| AppError::validation("destination_unit_cost", msg))?;
        }
        if let Some(price) = input.destination_selling_price {
            validate_non_negative_amount(price)
                .map_err(|msg| AppError::validation("destination_selling_price", msg))?;
        }
        Ok(())
    }

    /// Compute the cost impact of a conversion without writing anything.
    pub async fn propose(&self, input: ConversionInput) -> AppResult<ConversionProposal> {
        Self::validate(&input)?;

        let source = sqlx::query_as::<_, (String, Decimal)>(
            "SELECT name, current_stock FROM products WHERE id = $1",
        )
        .bind(input.source_product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Source product".to_string()))?;

        // Cost basis is always read fresh at conversion time
        let avg_unit_cost = ValuationService::new(self.db.clone())
            .average_unit_cost(input.source_product_id)
            .await?;

        let destination_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE LOWER(name) = LOWER($1))",
        )
        .bind(input.destination_name.trim())
        .fetch_one(&self.db)
        .await?;

        Ok(ConversionProposal {
            source_product_id: input.source_product_id,
            source_name: source.0,
            source_current_stock: source.1,
            quantity: input.quantity,
            source_avg_unit_cost: avg_unit_cost,
            cost_impact: (avg_unit_cost * input.quantity).round_dp(2),
            destination_name: input.destination_name.trim().to_string(),
            destination_exists,
            new_quantity: input.new_quantity,
        })
    }

    /// Execute a conversion atomically.
    pub async fn execute(&self, input: ExecuteConversionInput) -> AppResult<ConversionResult> {
        let ExecuteConversionInput {
            conversion: input,
            record_loss,
        } = input;

        Self::validate(&input)?;

        let source = sqlx::query_as::<_, (String, String)>(
            "SELECT name, unit FROM products WHERE id = $1",
        )
        .bind(input.source_product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Source product".to_string()))?;

        let destination_name = input.destination_name.trim().to_string();
        if source.0.eq_ignore_ascii_case(&destination_name) {
            return Err(AppError::validation(
                "destination_name",
                "Cannot convert a product into itself",
            ));
        }

        // Fresh cost basis, never cached
        let avg_unit_cost = ValuationService::new(self.db.clone())
            .average_unit_cost(input.source_product_id)
            .await?;
        let cost_impact = (avg_unit_cost * input.quantity).round_dp(2);

        let mut tx = self.db.begin().await?;

        // Conditional decrement: succeeds only if enough stock is on hand,
        // so two racing conversions cannot both drain the same units.
        let source_stock_after = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE products
            SET current_stock = current_stock - $2, updated_at = NOW()
            WHERE id = $1 AND current_stock >= $2
            RETURNING current_stock
            "#,
        )
        .bind(input.source_product_id)
        .bind(input.quantity)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::InsufficientStock(format!(
                "Cannot convert {} of {}: insufficient stock",
                input.quantity, source.0
            ))
        })?;

        // Conversion audit trail on the movement ledger
        let detail = ConversionDetail {
            original_product: source.0.clone(),
            converted_product: destination_name.clone(),
            original_quantity: input.quantity,
            new_quantity: input.new_quantity,
            unit: input.unit.clone(),
        };

        let movement_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO stock_movements (product_id, movement_type, quantity, notes, conversion)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.source_product_id)
        .bind(MovementType::Conversion.as_str())
        .bind(input.quantity)
        .bind(&input.notes)
        .bind(detail.to_value())
        .fetch_one(&mut *tx)
        .await?;

        // Upsert the destination product
        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM products WHERE LOWER(name) = LOWER($1)",
        )
        .bind(&destination_name)
        .fetch_optional(&mut *tx)
        .await?;

        let (destination_id, destination_stock_after) = match existing {
            Some(id) => {
                let stock = sqlx::query_scalar::<_, Decimal>(
                    r#"
                    UPDATE products
                    SET current_stock = current_stock + $2,
                        selling_price = COALESCE($3, selling_price),
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING current_stock
                    "#,
                )
                .bind(id)
                .bind(input.new_quantity)
                .bind(input.destination_selling_price)
                .fetch_one(&mut *tx)
                .await?;
                (id, stock)
            }
            None => {
                let unit = input
                    .unit
                    .clone()
                    .unwrap_or_else(|| source.1.clone());
                let id = sqlx::query_scalar::<_, Uuid>(
                    r#"
                    INSERT INTO products (name, unit, current_stock, selling_price)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(&destination_name)
                .bind(&unit)
                .bind(input.new_quantity)
                .bind(input.destination_selling_price)
                .fetch_one(&mut *tx)
                .await?;
                (id, input.new_quantity)
            }
        };

        // Forward cost basis for the destination: a receipt ledger row only,
        // stock was already added by the upsert above
        let destination_unit_cost = input.destination_unit_cost.unwrap_or(Decimal::ZERO);
        sqlx::query(
            r#"
            INSERT INTO receipts (product_id, quantity_received, unit_cost, total_cost)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(destination_id)
        .bind(input.new_quantity)
        .bind(destination_unit_cost)
        .bind(destination_unit_cost * input.new_quantity)
        .execute(&mut *tx)
        .await?;

        // Loss booking is the caller's choice, confirmed after propose
        let expense_id = if record_loss {
            let id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO expenses (amount, category, description, reference_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(cost_impact)
            .bind(STOCK_CONVERSION_CATEGORY)
            .bind(format!(
                "Converted {} {} of {} into {} {} of {}",
                input.quantity, source.1, source.0, input.new_quantity,
                input.unit.as_deref().unwrap_or(&source.1), destination_name
            ))
            .bind(movement_id)
            .fetch_one(&mut *tx)
            .await?;
            Some(id)
        } else {
            None
        };

        analytics::invalidate_metrics(&mut *tx, &[input.source_product_id, destination_id])
            .await?;

        tx.commit().await?;

        tracing::info!(
            source = %source.0,
            destination = %destination_name,
            quantity = %input.quantity,
            new_quantity = %input.new_quantity,
            "Stock conversion executed"
        );

        Ok(ConversionResult {
            movement_id,
            source_product_id: input.source_product_id,
            source_stock_after,
            destination_product_id: destination_id,
            destination_name,
            destination_stock_after,
            cost_impact,
            expense_id,
        })
    }
}
