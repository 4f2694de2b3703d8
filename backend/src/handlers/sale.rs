//! HTTP handlers for sales endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use shared::Sale;

use crate::error::AppResult;
use crate::services::sale::{RecordSaleInput, SaleFilter, SaleService};
use crate::AppState;

/// Record a register sale
pub async fn record_sale(
    State(state): State<AppState>,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    let sale = service.record_sale(input).await?;
    Ok(Json(sale))
}

/// List sales
pub async fn list_sales(
    State(state): State<AppState>,
    Query(filter): Query<SaleFilter>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db);
    let sales = service.list_sales(filter).await?;
    Ok(Json(sales))
}

/// Reverse a sale
pub async fn reverse_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    let sale = service.reverse_sale(sale_id).await?;
    Ok(Json(sale))
}
