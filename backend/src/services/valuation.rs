//! Inventory valuation service
//!
//! Weighted-average cost basis per product, built on the receipt ledger.
//! Pure reads, recomputed on demand and never cached; conversions read the
//! cost basis fresh at execution time.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::{classify_stock, stock_value, weighted_average_unit_cost, StockPolicy, StockStatus};

use crate::error::{AppError, AppResult};

/// Valuation service
#[derive(Clone)]
pub struct ValuationService {
    db: PgPool,
}

/// Valuation for a single product
#[derive(Debug, Clone, Serialize)]
pub struct ProductValuation {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub current_stock: Decimal,
    /// Σ effective total cost / Σ quantity received; 0 with no receipts.
    pub avg_unit_cost: Decimal,
    pub stock_value: Decimal,
}

/// Valuation entry with its stock health tier, for the dashboard list
#[derive(Debug, Serialize)]
pub struct ValuedProduct {
    #[serde(flatten)]
    pub valuation: ProductValuation,
    pub sales_count_30d: i64,
    pub status: StockStatus,
}

/// Aggregate valuation across the whole registry
#[derive(Debug, Serialize)]
pub struct ValuationSummary {
    pub total_products: i64,
    pub total_stock_value: Decimal,
    pub out_of_stock_count: i64,
    pub low_stock_count: i64,
    pub slow_moving_count: i64,
    pub products: Vec<ValuedProduct>,
}

/// Row for the valuation join
#[derive(Debug, sqlx::FromRow)]
struct ValuationRow {
    id: Uuid,
    name: String,
    unit: String,
    current_stock: Decimal,
    units_received: Decimal,
    total_invested: Decimal,
    sales_count_30d: i64,
}

impl ValuationService {
    /// Create a new ValuationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Valuation for a single product
    pub async fn product_valuation(&self, product_id: Uuid) -> AppResult<ProductValuation> {
        let row = sqlx::query_as::<_, (String, String, Decimal, Decimal, Decimal)>(
            r#"
            SELECT p.name, p.unit, p.current_stock,
                   COALESCE(r.units, 0) AS units_received,
                   COALESCE(r.invested, 0) AS total_invested
            FROM products p
            LEFT JOIN (
                SELECT product_id,
                       SUM(quantity_received) AS units,
                       SUM(COALESCE(total_cost, unit_cost * quantity_received)) AS invested
                FROM receipts
                GROUP BY product_id
            ) r ON r.product_id = p.id
            WHERE p.id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let avg_unit_cost = weighted_average_unit_cost(row.4, row.3);

        Ok(ProductValuation {
            product_id,
            product_name: row.0,
            unit: row.1,
            current_stock: row.2,
            avg_unit_cost,
            stock_value: stock_value(row.2, avg_unit_cost),
        })
    }

    /// Average unit cost alone, for callers that transfer cost basis.
    pub async fn average_unit_cost(&self, product_id: Uuid) -> AppResult<Decimal> {
        Ok(self.product_valuation(product_id).await?.avg_unit_cost)
    }

    /// Valuation of the whole registry with per-product stock health and
    /// the aggregate counts the dashboard shows.
    pub async fn valuation_summary(&self, policy: &StockPolicy) -> AppResult<ValuationSummary> {
        let since = Utc::now() - Duration::days(policy.sales_window_days);

        let rows = sqlx::query_as::<_, ValuationRow>(
            r#"
            SELECT p.id, p.name, p.unit, p.current_stock,
                   COALESCE(r.units, 0) AS units_received,
                   COALESCE(r.invested, 0) AS total_invested,
                   COALESCE(s.sales_count, 0) AS sales_count_30d
            FROM products p
            LEFT JOIN (
                SELECT product_id,
                       SUM(quantity_received) AS units,
                       SUM(COALESCE(total_cost, unit_cost * quantity_received)) AS invested
                FROM receipts
                GROUP BY product_id
            ) r ON r.product_id = p.id
            LEFT JOIN (
                SELECT product_id, COUNT(*) AS sales_count
                FROM sales
                WHERE is_reversed = FALSE AND created_at >= $1
                GROUP BY product_id
            ) s ON s.product_id = p.id
            ORDER BY p.name
            "#,
        )
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        let mut total_stock_value = Decimal::ZERO;
        let mut out_of_stock_count = 0;
        let mut low_stock_count = 0;
        let mut slow_moving_count = 0;

        let products: Vec<ValuedProduct> = rows
            .into_iter()
            .map(|row| {
                let avg_unit_cost = weighted_average_unit_cost(row.total_invested, row.units_received);
                let value = stock_value(row.current_stock, avg_unit_cost);
                let status = classify_stock(row.current_stock, row.sales_count_30d, policy);

                total_stock_value += value;
                match status {
                    StockStatus::Out => out_of_stock_count += 1,
                    StockStatus::Low => low_stock_count += 1,
                    StockStatus::Slow => slow_moving_count += 1,
                    StockStatus::Healthy => {}
                }

                ValuedProduct {
                    valuation: ProductValuation {
                        product_id: row.id,
                        product_name: row.name,
                        unit: row.unit,
                        current_stock: row.current_stock,
                        avg_unit_cost,
                        stock_value: value,
                    },
                    sales_count_30d: row.sales_count_30d,
                    status,
                }
            })
            .collect();

        Ok(ValuationSummary {
            total_products: products.len() as i64,
            total_stock_value,
            out_of_stock_count,
            low_stock_count,
            slow_moving_count,
            products,
        })
    }
}
