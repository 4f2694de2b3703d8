//! HTTP handlers for reconciliation analytics endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::analytics::{AnalyticsService, ProductMetricsRecord};
use crate::AppState;

/// Metric bundle for one product (cached, recomputed on miss)
pub async fn get_product_metrics(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductMetricsRecord>> {
    let service = AnalyticsService::new(state.db.clone());
    let policy = state.config.stock_policy.to_policy();
    let metrics = service.product_metrics(product_id, &policy).await?;
    Ok(Json(metrics))
}

/// Recompute every product's metric bundle (the "Analyze" trigger)
pub async fn refresh_metrics(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductMetricsRecord>>> {
    let service = AnalyticsService::new(state.db.clone());
    let policy = state.config.stock_policy.to_policy();
    let metrics = service.refresh_all(&policy).await?;
    Ok(Json(metrics))
}
