//! Supply-chain reconciliation service
//!
//! Merges the receipt ledger, the registry and the sales stream into a
//! per-product metric bundle: acquisition totals, turnover, margin and
//! break-even. Bundles are kept in an explicit per-product cache that every
//! ledger write invalidates in its own transaction; reads recompute on miss
//! and the "Analyze" trigger recomputes wholesale.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared::{compute_metric_bundle, AcquisitionSummary, SalesSummary, StockPolicy};

use crate::error::{AppError, AppResult};

/// Reconciliation service
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
}

/// The full per-product metric bundle, as served and cached.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductMetricsRecord {
    pub product_id: Uuid,
    pub product_name: String,
    pub units_received: Decimal,
    pub total_invested: Decimal,
    pub supplier_count: i64,
    pub units_remaining: Decimal,
    /// Days since the earliest receipt (age of the oldest batch).
    pub avg_inventory_age_days: i64,
    pub units_sold: Decimal,
    pub revenue: Decimal,
    pub avg_selling_price: Decimal,
    pub avg_unit_cost: Decimal,
    pub turnover_times: Decimal,
    pub turnover_rate: Decimal,
    pub cost_of_goods_sold: Decimal,
    pub profit_margin: Decimal,
    pub break_even_units: i64,
    pub status: String,
    pub refreshed_at: DateTime<Utc>,
}

const METRIC_COLUMNS: &str = "product_id, product_name, units_received, total_invested, \
     supplier_count, units_remaining, avg_inventory_age_days, units_sold, revenue, \
     avg_selling_price, avg_unit_cost, turnover_times, turnover_rate, cost_of_goods_sold, \
     profit_margin, break_even_units, status, refreshed_at";

/// Drop cached bundles for the given products. Ledger writers call this
/// inside their own transaction so a committed write always leaves the
/// cache cold rather than stale.
pub(crate) async fn invalidate_metrics(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM product_metrics WHERE product_id = ANY($1)")
        .bind(product_ids)
        .execute(conn)
        .await?;
    Ok(())
}

impl AnalyticsService {
    /// Create a new AnalyticsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Metric bundle for one product: cached row if present, otherwise a
    /// fresh computation stored back into the cache.
    pub async fn product_metrics(
        &self,
        product_id: Uuid,
        policy: &StockPolicy,
    ) -> AppResult<ProductMetricsRecord> {
        let cached = sqlx::query_as::<_, ProductMetricsRecord>(&format!(
            "SELECT {} FROM product_metrics WHERE product_id = $1",
            METRIC_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(record) = cached {
            return Ok(record);
        }

        self.compute_and_store(product_id, policy).await
    }

    /// Recompute every product's bundle wholesale: the explicit "Analyze"
    /// refresh trigger.
    pub async fn refresh_all(&self, policy: &StockPolicy) -> AppResult<Vec<ProductMetricsRecord>> {
        let product_ids =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM products ORDER BY name")
                .fetch_all(&self.db)
                .await?;

        tracing::info!(products = product_ids.len(), "Refreshing product metrics");

        let mut records = Vec::with_capacity(product_ids.len());
        for product_id in product_ids {
            records.push(self.compute_and_store(product_id, policy).await?);
        }

        Ok(records)
    }

    /// Recompute one product's bundle from the ledgers and upsert the cache.
    async fn compute_and_store(
        &self,
        product_id: Uuid,
        policy: &StockPolicy,
    ) -> AppResult<ProductMetricsRecord> {
        // Stage 2: the registry row is authoritative for remaining stock
        let product = sqlx::query_as::<_, (String, Decimal, Option<Decimal>)>(
            "SELECT name, current_stock, selling_price FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        // Stage 1: acquisition aggregates from the receipt ledger
        let acquisition_row = sqlx::query_as::<_, (Decimal, Decimal, i64, Option<NaiveDate>)>(
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

        let acquisition = AcquisitionSummary {
            units_received: acquisition_row.0,
            total_invested: acquisition_row.1,
            supplier_count: acquisition_row.2,
            earliest_receipt: acquisition_row.3,
        };

        // Stage 3: reversal-netted totals over the sales stream, both
        // origins included, each sale counted once
        let sales_row = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT COALESCE(SUM(quantity), 0), COALESCE(SUM(amount), 0)
            FROM sales
            WHERE product_id = $1 AND is_reversed = FALSE
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        let sales = SalesSummary {
            units_sold: sales_row.0,
            revenue: sales_row.1,
        };

        let bundle = compute_metric_bundle(
            product.1,
            product.2,
            &acquisition,
            &sales,
            Utc::now().date_naive(),
            policy.low_stock_threshold,
        );

        let refreshed_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            INSERT INTO product_metrics (
                product_id, product_name, units_received, total_invested, supplier_count,
                units_remaining, avg_inventory_age_days, units_sold, revenue,
                avg_selling_price, avg_unit_cost, turnover_times, turnover_rate,
                cost_of_goods_sold, profit_margin, break_even_units, status, refreshed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, NOW())
            ON CONFLICT (product_id) DO UPDATE SET
                product_name = EXCLUDED.product_name,
                units_received = EXCLUDED.units_received,
                total_invested = EXCLUDED.total_invested,
                supplier_count = EXCLUDED.supplier_count,
                units_remaining = EXCLUDED.units_remaining,
                avg_inventory_age_days = EXCLUDED.avg_inventory_age_days,
                units_sold = EXCLUDED.units_sold,
                revenue = EXCLUDED.revenue,
                avg_selling_price = EXCLUDED.avg_selling_price,
                avg_unit_cost = EXCLUDED.avg_unit_cost,
                turnover_times = EXCLUDED.turnover_times,
                turnover_rate = EXCLUDED.turnover_rate,
                cost_of_goods_sold = EXCLUDED.cost_of_goods_sold,
                profit_margin = EXCLUDED.profit_margin,
                break_even_units = EXCLUDED.break_even_units,
                status = EXCLUDED.status,
                refreshed_at = NOW()
            RETURNING refreshed_at
            "#,
        )
        .bind(product_id)
        .bind(&product.0)
        .bind(bundle.units_received)
        .bind(bundle.total_invested)
        .bind(bundle.supplier_count)
        .bind(bundle.units_remaining)
        .bind(bundle.avg_inventory_age_days)
        .bind(bundle.units_sold)
        .bind(bundle.revenue)
        .bind(bundle.avg_selling_price)
        .bind(bundle.avg_unit_cost)
        .bind(bundle.turnover_times)
        .bind(bundle.turnover_rate)
        .bind(bundle.cost_of_goods_sold)
        .bind(bundle.profit_margin)
        .bind(bundle.break_even_units)
        .bind(bundle.status.as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(ProductMetricsRecord {
            product_id,
            product_name: product.0,
            units_received: bundle.units_received,
            total_invested: bundle.total_invested,
            supplier_count: bundle.supplier_count,
            units_remaining: bundle.units_remaining,
            avg_inventory_age_days: bundle.avg_inventory_age_days,
            units_sold: bundle.units_sold,
            revenue: bundle.revenue,
            avg_selling_price: bundle.avg_selling_price,
            avg_unit_cost: bundle.avg_unit_cost,
            turnover_times: bundle.turnover_times,
            turnover_rate: bundle.turnover_rate,
            cost_of_goods_sold: bundle.cost_of_goods_sold,
            profit_margin: bundle.profit_margin,
            break_even_units: bundle.break_even_units,
            status: bundle.status.as_str().to_string(),
            refreshed_at,
        })
    }
}
