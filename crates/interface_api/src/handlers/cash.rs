//! Cash register handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use core_kernel::BranchId;
use domain_cash::CashCount;

use crate::dto::cash::*;
use crate::middleware::{JsonBody, Operator, QueryParams};
use crate::{error::ApiError, AppState};

/// Opens today's register with the counted float
pub async fn open_register(
    State(state): State<AppState>,
    operator: Operator,
    JsonBody(body): JsonBody<CashCountBody>,
) -> Result<(StatusCode, Json<DailyOperationResponse>), ApiError> {
    let count = CashCount::new(body.cash_mxn, body.cash_usd)?;
    let operation = state
        .cash
        .open(body.branch_id.map(BranchId::from), count, operator.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(DailyOperationResponse::from(&operation))))
}

/// Closes today's register with the end-of-day count (corte Z)
pub async fn close_register(
    State(state): State<AppState>,
    operator: Operator,
    JsonBody(body): JsonBody<CashCountBody>,
) -> Result<Json<DailyOperationResponse>, ApiError> {
    let count = CashCount::new(body.cash_mxn, body.cash_usd)?;
    let operation = state
        .cash
        .close(body.branch_id.map(BranchId::from), count, operator.as_str())
        .await?;
    Ok(Json(DailyOperationResponse::from(&operation)))
}

/// Today's register in any state
pub async fn current_register(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<BranchParams>,
) -> Result<Json<CurrentOperationResponse>, ApiError> {
    let operation = state
        .cash
        .get_current(params.branch_id.map(BranchId::from))
        .await?;
    Ok(Json(CurrentOperationResponse {
        business_date: state.cash.today(),
        operation: operation.as_ref().map(DailyOperationResponse::from),
    }))
}

/// Past registers in a date range, newest first
pub async fn register_history(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<HistoryParams>,
) -> Result<Json<Vec<DailyOperationResponse>>, ApiError> {
    let operations = state
        .cash
        .history(params.branch_id.map(BranchId::from), params.from, params.to)
        .await?;
    Ok(Json(operations.iter().map(DailyOperationResponse::from).collect()))
}
