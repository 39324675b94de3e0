//! Cash Register Domain - Daily Operations
//!
//! Tracks the per-day, per-branch cash drawer session: the opening float
//! and the closing count in pesos and dollars.
//!
//! # Lifecycle
//!
//! - **Open**: only when no session exists for the branch today
//! - **Close**: only an open session; irreversible
//! - At most one session per (branch, business date), enforced by storage

pub mod operation;
pub mod ports;
pub mod service;
pub mod error;

pub use operation::{CashCount, CashMovement, DailyOperation, OperationStatus};
pub use ports::DailyOperationPort;
pub use service::CashRegisterService;
pub use error::CashError;
