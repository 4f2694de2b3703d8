//! Route definitions for Shoplog

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product registry
        .nest("/products", product_routes())
        // Receipt ledger
        .nest("/receipts", receipt_routes())
        // Movement ledger
        .nest("/movements", movement_routes())
        // Sales stream
        .nest("/sales", sale_routes())
        // Expense ledger
        .nest("/expenses", expense_routes())
        // Stock conversion
        .nest("/conversions", conversion_routes())
        // Reconciliation analytics
        .nest("/analytics", analytics_routes())
        // Reporting
        .nest("/reports", report_routes())
}

/// Product registry routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/status", get(handlers::list_products_with_status))
        .route(
            "/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
        .route("/:product_id/stock", put(handlers::adjust_stock))
        .route("/:product_id/valuation", get(handlers::get_product_valuation))
        .route(
            "/:product_id/acquisition",
            get(handlers::get_acquisition_summary),
        )
}

/// Receipt ledger routes
fn receipt_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_receipts).post(handlers::record_receipt),
    )
}

/// Movement ledger routes
fn movement_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_movements).post(handlers::record_movement),
    )
}

/// Sales stream routes
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::record_sale))
        .route("/:sale_id/reverse", post(handlers::reverse_sale))
}

/// Expense ledger routes
fn expense_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_expenses).post(handlers::record_expense),
        )
        .route("/totals", get(handlers::expense_totals))
}

/// Stock conversion routes
fn conversion_routes() -> Router<AppState> {
    Router::new()
        .route("/propose", post(handlers::propose_conversion))
        .route("/", post(handlers::execute_conversion))
}

/// Reconciliation analytics routes
fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/products/:product_id", get(handlers::get_product_metrics))
        .route("/refresh", post(handlers::refresh_metrics))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/valuation", get(handlers::get_valuation_summary))
        .route("/metrics", get(handlers::get_metrics_report))
}
