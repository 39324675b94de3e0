//! Credit ledger handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{CreditAccountId, Money};
use domain_credit::{
    AccountQuery, AdjustmentRequest, ChargeRequest, CreditError, OpenAccountRequest,
    PaymentRequest,
};

use crate::dto::credit::*;
use crate::middleware::{JsonBody, Operator, PathParam, QueryParams};
use crate::{error::ApiError, AppState};

/// Opens a credit account for an existing customer
pub async fn open_account(
    State(state): State<AppState>,
    operator: Operator,
    JsonBody(body): JsonBody<OpenAccountBody>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    body.validate()?;
    let currency = state.credit.policy().currency;
    let request = OpenAccountRequest {
        customer_id: body.customer_id.into(),
        credit_limit: Money::new(body.credit_limit, currency),
        payment_terms_days: body.payment_terms_days,
        notes: body.notes,
        interest_rate: body.interest_rate,
    };

    let account = state.credit.open_account(request, operator.as_str()).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

/// Lists accounts, optionally filtered by status, customer, or customer name
pub async fn list_accounts(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<AccountListParams>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let query = AccountQuery {
        customer_id: params.customer_id.map(Into::into),
        customer_name: params
            .customer_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        status: params.status,
        limit: params.limit,
        offset: params.offset,
    };
    let accounts = state.credit.list_accounts(query).await?;
    Ok(Json(accounts.iter().map(AccountResponse::from).collect()))
}

/// Gets an account by ID
pub async fn get_account(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.credit.get_account(CreditAccountId::from(id)).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// Posts a purchase on credit
pub async fn apply_charge(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    operator: Operator,
    JsonBody(body): JsonBody<ChargeBody>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    body.validate()?;
    let currency = state.credit.policy().currency;
    let request = ChargeRequest {
        amount: Money::new(body.amount, currency),
        description: body.description,
        reference: body.reference,
    };

    let outcome = state
        .credit
        .apply_charge(id.into(), request, operator.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Posts a customer payment
pub async fn apply_payment(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    operator: Operator,
    JsonBody(body): JsonBody<PaymentBody>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    body.validate()?;
    let currency = state.credit.policy().currency;
    let request = PaymentRequest {
        amount: Money::new(body.amount, currency),
        payment_method: body.payment_method,
        reference: body.reference,
        notes: body.notes,
    };

    let outcome = state
        .credit
        .apply_payment(id.into(), request, operator.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Posts a signed manual adjustment
pub async fn apply_adjustment(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    operator: Operator,
    JsonBody(body): JsonBody<AdjustmentBody>,
) -> Result<(StatusCode, Json<PostingResponse>), ApiError> {
    body.validate()?;
    let currency = state.credit.policy().currency;
    let request = AdjustmentRequest {
        amount: Money::new(body.amount, currency),
        description: body.description,
        reference: body.reference,
    };

    let outcome = state
        .credit
        .apply_adjustment(id.into(), request, operator.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Suspends, reactivates, or closes an account
pub async fn change_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    operator: Operator,
    JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .credit
        .change_status(id.into(), body.status, operator.as_str())
        .await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// Transaction history with the running balance after each entry
pub async fn list_transactions(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<StatementResponse>, ApiError> {
    let statement = state.credit.statement(id.into()).await?;
    let closing_balance = statement.closing_balance().map_err(CreditError::from)?;

    let transactions = statement
        .running_balances()
        .map(|line| TransactionResponse {
            running_balance: Some(line.running_balance.amount()),
            ..TransactionResponse::from(line.transaction)
        })
        .collect();

    Ok(Json(StatementResponse {
        account_id: id,
        currency: statement.currency.code().to_string(),
        closing_balance: closing_balance.amount(),
        transactions,
    }))
}

/// Outstanding balance of one account by age
pub async fn account_aging(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<AgingResponse>, ApiError> {
    let report = state.credit.account_aging(id.into()).await?;
    let total = report.total().map_err(CreditError::from)?;
    Ok(Json(AgingResponse::new(&report, total.amount())))
}

/// Store-wide credit totals
pub async fn portfolio_summary(
    State(state): State<AppState>,
) -> Result<Json<PortfolioResponse>, ApiError> {
    let summary = state.credit.portfolio_summary().await?;
    Ok(Json(PortfolioResponse::from(&summary)))
}

/// Store-wide receivable aging
pub async fn portfolio_aging(
    State(state): State<AppState>,
) -> Result<Json<AgingResponse>, ApiError> {
    let report = state.credit.portfolio_aging().await?;
    let total = report.total().map_err(CreditError::from)?;
    Ok(Json(AgingResponse::new(&report, total.amount())))
}
