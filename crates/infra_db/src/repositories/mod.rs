//! Repository implementations for persisted aggregates
//!
//! Repositories encapsulate SQL and map between database rows and plain
//! column values. Conversion to domain types happens in [`crate::adapters`].
//!
//! Each repository follows these principles:
//! - Runtime-checked queries with `FromRow` row types
//! - Transactions for multi-statement writes
//! - Optimistic concurrency through conditional `UPDATE ... WHERE`

pub mod credit;
pub mod cash;
pub mod customer;
pub mod chat;

pub use credit::CreditRepository;
pub use cash::DailyOperationRepository;
pub use customer::CustomerRepository;
pub use chat::ChatRepository;
