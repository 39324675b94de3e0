//! HTTP API Layer
//!
//! This crate provides the REST API for the store back office using Axum:
//! customer credit accounts and the daily cash register.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each domain
//! - **Middleware**: Audit logging and the operator extractor
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent `{error, message}` responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::with_postgres(pool, config)?;
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{CoreError, HealthCheckable, SystemClock};
use domain_cash::CashRegisterService;
use domain_credit::CreditLedgerService;
use infra_db::{
    PostgresCreditLedgerAdapter, PostgresCustomerDirectory, PostgresDailyOperationAdapter,
    WhatsAppChatNotifier,
};

use crate::config::ApiConfig;
use crate::handlers::{cash, credit, health};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub credit: Arc<CreditLedgerService>,
    pub cash: Arc<CashRegisterService>,
    /// Adapters consulted by the readiness probe
    pub health_checks: Vec<Arc<dyn HealthCheckable>>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires both services to the PostgreSQL adapters
    pub fn with_postgres(pool: PgPool, config: ApiConfig) -> Result<Self, CoreError> {
        let calendar = config.business_calendar()?;
        let clock = Arc::new(SystemClock);

        let ledger = Arc::new(PostgresCreditLedgerAdapter::new(pool.clone()));
        let directory = Arc::new(PostgresCustomerDirectory::new(pool.clone()));
        let notifier = Arc::new(WhatsAppChatNotifier::new(pool.clone()));
        let operations = Arc::new(PostgresDailyOperationAdapter::new(pool));

        let credit = CreditLedgerService::new(
            ledger.clone(),
            directory,
            notifier,
            clock.clone(),
            calendar,
            config.credit_policy(),
        );
        let cash = CashRegisterService::new(operations.clone(), clock, calendar);
        let health_checks: Vec<Arc<dyn HealthCheckable>> = vec![ledger, operations];

        Ok(Self {
            credit: Arc::new(credit),
            cash: Arc::new(cash),
            health_checks,
            config,
        })
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let credit_routes = Router::new()
        .route("/accounts", post(credit::open_account).get(credit::list_accounts))
        .route("/accounts/:id", get(credit::get_account))
        .route("/accounts/:id/charges", post(credit::apply_charge))
        .route("/accounts/:id/payments", post(credit::apply_payment))
        .route("/accounts/:id/adjustments", post(credit::apply_adjustment))
        .route("/accounts/:id/status", post(credit::change_status))
        .route("/accounts/:id/transactions", get(credit::list_transactions))
        .route("/accounts/:id/aging", get(credit::account_aging))
        .route("/summary", get(credit::portfolio_summary))
        .route("/aging", get(credit::portfolio_aging));

    let cash_routes = Router::new()
        .route("/operations", get(cash::register_history))
        .route("/operations/open", post(cash::open_register))
        .route("/operations/close", post(cash::close_register))
        .route("/operations/current", get(cash::current_register));

    let api_routes = Router::new()
        .nest("/credit", credit_routes)
        .nest("/cash", cash_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .map_response(axum::response::IntoResponse::into_response)
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
