//! HTTP handlers for expense endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use shared::Expense;

use crate::error::AppResult;
use crate::services::expense::{
    CategoryTotal, ExpenseFilter, ExpenseService, RecordExpenseInput,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TotalsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Record an expense
pub async fn record_expense(
    State(state): State<AppState>,
    Json(input): Json<RecordExpenseInput>,
) -> AppResult<Json<Expense>> {
    let service = ExpenseService::new(state.db);
    let expense = service.record_expense(input).await?;
    Ok(Json(expense))
}

/// List expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(filter): Query<ExpenseFilter>,
) -> AppResult<Json<Vec<Expense>>> {
    let service = ExpenseService::new(state.db);
    let expenses = service.list_expenses(filter).await?;
    Ok(Json(expenses))
}

/// Expense totals by category
pub async fn expense_totals(
    State(state): State<AppState>,
    Query(query): Query<TotalsQuery>,
) -> AppResult<Json<Vec<CategoryTotal>>> {
    let service = ExpenseService::new(state.db);
    let start = query
        .start_date
        .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    let end = query
        .end_date
        .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap());
    let totals = service.totals_by_category(start, end).await?;
    Ok(Json(totals))
}
