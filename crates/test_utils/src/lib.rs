//! Test Utilities Crate
//!
//! Shared test infrastructure, fixtures, and helpers for the store
//! back-office test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for customers, money, and dates
//! - `builders`: Builders for accounts, ledger entries, and daily operations
//! - `database`: PostgreSQL test databases and the `db_test!` macro
//! - `assertions`: Ledger and cash register assertion helpers
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
