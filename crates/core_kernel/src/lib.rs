//! Core Kernel - Foundational types for the retail back office
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Business clock and calendar in the store's timezone
//! - Common identifiers
//! - Port abstractions shared by the domain crates and their adapters

pub mod money;
pub mod clock;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use clock::{BusinessCalendar, Clock, ClockError, FixedClock, SystemClock, Timezone};
pub use identifiers::{
    BranchId, CreditAccountId, CreditTransactionId, CustomerId, DailyOperationId,
};
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
pub use error::CoreError;
