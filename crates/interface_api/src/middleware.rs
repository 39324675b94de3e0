//! API middleware and request extractors

use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequest, FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::time::Instant;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// JSON request body; malformed input renders as an `ApiError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string parameters; malformed input renders as an `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Path parameters; malformed input renders as an `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// Header carrying the name of the employee at the register
pub const OPERATOR_HEADER: &str = "x-operator";

/// Name recorded as `created_by` / `opened_by` on writes
///
/// Taken from the `x-operator` header, falling back to the configured
/// default operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator(pub String);

impl Operator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn header_operator(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(OPERATOR_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<S> FromRequestParts<S> for Operator
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let name = match header_operator(parts) {
            Some(name) => name,
            None => AppState::from_ref(state).config.default_operator.clone(),
        };
        Ok(Operator(name))
    }
}

/// Audit logging middleware
///
/// Logs every API request with the operator and latency
pub async fn audit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let operator = request
        .headers()
        .get(OPERATOR_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.default_operator.clone());

    let start = Instant::now();
    let response = next.run(request).await;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        operator = %operator,
        status = status.as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "API request"
    );

    response
}
