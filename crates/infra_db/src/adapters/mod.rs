//! Domain Adapters
//!
//! Implementations of the domain ports on top of the repositories.
//!
//! Each adapter:
//! - Implements the domain's port trait
//! - Translates between domain models and database row types
//! - Surfaces `DatabaseError` as `PortError`
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresCreditLedgerAdapter;
//! use domain_credit::CreditLedgerPort;
//!
//! let ledger = PostgresCreditLedgerAdapter::new(pool);
//! let account = ledger.get_account(account_id).await?;
//! ```

pub mod credit;
pub mod cash;
pub mod customer;
pub mod whatsapp;

pub use credit::PostgresCreditLedgerAdapter;
pub use cash::PostgresDailyOperationAdapter;
pub use customer::PostgresCustomerDirectory;
pub use whatsapp::WhatsAppChatNotifier;

use core_kernel::{HealthCheckResult, PortError};
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Runs `SELECT 1` against the pool and reports latency
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {e}")),
    }
}

/// Error for a stored value that no longer parses into its domain type
pub(crate) fn decode_error(column: &str, detail: impl std::fmt::Display) -> PortError {
    DatabaseError::decode(column, detail).into()
}
