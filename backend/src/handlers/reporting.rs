//! Reporting handlers for dashboard metrics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::analytics::AnalyticsService;
use crate::services::reporting::{DashboardMetrics, ReportingService};
use crate::services::valuation::{ValuationService, ValuationSummary};
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.db.clone());
    let policy = state.config.stock_policy.to_policy();
    let metrics = service.dashboard_metrics(&policy).await?;
    Ok(Json(metrics))
}

/// Get the valuation summary for the whole registry
pub async fn get_valuation_summary(
    State(state): State<AppState>,
) -> AppResult<Json<ValuationSummary>> {
    let service = ValuationService::new(state.db.clone());
    let policy = state.config.stock_policy.to_policy();
    let summary = service.valuation_summary(&policy).await?;
    Ok(Json(summary))
}

/// Refresh and export the per-product metric table
pub async fn get_metrics_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let service = AnalyticsService::new(state.db.clone());
    let policy = state.config.stock_policy.to_policy();
    let data = service.refresh_all(&policy).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"product_metrics.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(data).into_response())
    }
}
