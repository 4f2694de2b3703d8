//! HTTP handlers for stock movement endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use shared::StockMovement;

use crate::error::AppResult;
use crate::services::movement::{MovementFilter, MovementService, RecordMovementInput};
use crate::AppState;

/// Record a stock movement
pub async fn record_movement(
    State(state): State<AppState>,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<StockMovement>> {
    let service = MovementService::new(state.db);
    let movement = service.record_movement(input).await?;
    Ok(Json(movement))
}

/// List stock movements
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = MovementService::new(state.db);
    let movements = service.list_movements(filter).await?;
    Ok(Json(movements))
}
