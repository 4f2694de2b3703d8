//! HTTP handlers for stock conversion endpoints
//!
//! Conversions are a two-step interaction: propose shows the computed cost
//! impact, execute applies the conversion after the caller confirms.

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::conversion::{
    ConversionInput, ConversionProposal, ConversionResult, ConversionService,
    ExecuteConversionInput,
};
use crate::AppState;

/// Preview a conversion's cost impact without writing anything
pub async fn propose_conversion(
    State(state): State<AppState>,
    Json(input): Json<ConversionInput>,
) -> AppResult<Json<ConversionProposal>> {
    let service = ConversionService::new(state.db);
    let proposal = service.propose(input).await?;
    Ok(Json(proposal))
}

/// Execute a confirmed conversion
pub async fn execute_conversion(
    State(state): State<AppState>,
    Json(input): Json<ExecuteConversionInput>,
) -> AppResult<Json<ConversionResult>> {
    let service = ConversionService::new(state.db);
    let result = service.execute(input).await?;
    Ok(Json(result))
}
