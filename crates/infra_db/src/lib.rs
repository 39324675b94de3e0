//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the store back office using SQLx.
//!
//! # Architecture
//!
//! - [`repositories`] hold the SQL and row types
//! - [`adapters`] implement the domain ports on top of them
//!
//! # Concurrency
//!
//! Credit postings update the account with `WHERE version = $expected`
//! inside the same transaction that appends the ledger entry, so a stale
//! writer changes nothing and gets a conflict. Daily operations rely on a
//! unique index over (branch, business date).
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresCreditLedgerAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/tienda")).await?;
//! run_migrations(&pool).await?;
//! let ledger = PostgresCreditLedgerAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{
    PostgresCreditLedgerAdapter, PostgresCustomerDirectory, PostgresDailyOperationAdapter,
    WhatsAppChatNotifier,
};
