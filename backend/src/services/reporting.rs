//! Reporting service for dashboard metrics and data export

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use shared::StockPolicy;

use crate::error::AppResult;
use crate::services::valuation::ValuationService;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_products: i64,
    pub total_stock_value: Decimal,
    pub out_of_stock_count: i64,
    pub low_stock_count: i64,
    pub slow_moving_count: i64,
    pub sales_count_30d: i64,
    pub revenue_30d: Decimal,
    pub expenses_30d: Decimal,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Summary numbers for the dashboard
    pub async fn dashboard_metrics(&self, policy: &StockPolicy) -> AppResult<DashboardMetrics> {
        let valuation = ValuationService::new(self.db.clone())
            .valuation_summary(policy)
            .await?;

        let since = Utc::now() - Duration::days(policy.sales_window_days);

        let sales: (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(amount), 0)
            FROM sales
            WHERE is_reversed = FALSE AND created_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(&self.db)
        .await?;

        let expenses: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE created_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            total_products: valuation.total_products,
            total_stock_value: valuation.total_stock_value,
            out_of_stock_count: valuation.out_of_stock_count,
            low_stock_count: valuation.low_stock_count,
            slow_moving_count: valuation.slow_moving_count,
            sales_count_30d: sales.0,
            revenue_30d: sales.1,
            expenses_30d: expenses,
        })
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            crate::error::AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
