//! HTTP handlers for supplier receipt endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use shared::{AcquisitionSummary, Receipt};

use crate::error::AppResult;
use crate::services::receipt::{ReceiptFilter, ReceiptService, RecordReceiptInput};
use crate::AppState;

/// Record a supplier receipt
pub async fn record_receipt(
    State(state): State<AppState>,
    Json(input): Json<RecordReceiptInput>,
) -> AppResult<Json<Receipt>> {
    let service = ReceiptService::new(state.db);
    let receipt = service.record_receipt(input).await?;
    Ok(Json(receipt))
}

/// List receipts
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(filter): Query<ReceiptFilter>,
) -> AppResult<Json<Vec<Receipt>>> {
    let service = ReceiptService::new(state.db);
    let receipts = service.list_receipts(filter).await?;
    Ok(Json(receipts))
}

/// Acquisition aggregates for a product
pub async fn get_acquisition_summary(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<AcquisitionSummaryResponse>> {
    let service = ReceiptService::new(state.db);
    let summary = service.acquisition_summary(product_id).await?;
    Ok(Json(summary.into()))
}

/// Serializable view of the acquisition aggregates
#[derive(Debug, serde::Serialize)]
pub struct AcquisitionSummaryResponse {
    pub units_received: rust_decimal::Decimal,
    pub total_invested: rust_decimal::Decimal,
    pub supplier_count: i64,
    pub earliest_receipt: Option<chrono::NaiveDate>,
}

impl From<AcquisitionSummary> for AcquisitionSummaryResponse {
    fn from(summary: AcquisitionSummary) -> Self {
        Self {
            units_received: summary.units_received,
            total_invested: summary.total_invested,
            supplier_count: summary.supplier_count,
            earliest_receipt: summary.earliest_receipt,
        }
    }
}
