//! HTTP handlers for product registry endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::{PaginatedResponse, Pagination, Product};

use crate::error::AppResult;
use crate::services::product::{
    AdjustStockInput, CreateProductInput, ProductService, ProductWithStatus, UpdateProductInput,
};
use crate::services::valuation::{ProductValuation, ValuationService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Register a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// List products, paginated
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    let service = ProductService::new(state.db);
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };
    let products = service.list_products(pagination).await?;
    Ok(Json(products))
}

/// Get a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Apply a manual stock adjustment
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db.clone());
    let product = service.adjust_stock(product_id, input).await?;
    Ok(Json(product))
}

/// Weighted-average valuation for a product
pub async fn get_product_valuation(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductValuation>> {
    let service = ValuationService::new(state.db);
    let valuation = service.product_valuation(product_id).await?;
    Ok(Json(valuation))
}

/// List products with their stock health classification
pub async fn list_products_with_status(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductWithStatus>>> {
    let service = ProductService::new(state.db.clone());
    let policy = state.config.stock_policy.to_policy();
    let products = service.list_with_status(&policy).await?;
    Ok(Json(products))
}
