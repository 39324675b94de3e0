//! Credit domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{MoneyError, PortError};

use crate::account::AccountStatus;

/// Errors that can occur in the credit domain
#[derive(Debug, Error)]
pub enum CreditError {
    /// Input rejected before any state was touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credit (payment or negative adjustment) larger than what is owed
    #[error("Invalid amount: {requested} exceeds outstanding balance {balance}")]
    InvalidAmount {
        requested: Decimal,
        balance: Decimal,
    },

    /// Account not found
    #[error("Credit account not found: {0}")]
    AccountNotFound(String),

    /// The account's status does not allow the requested operation
    #[error("Credit account is {status}: {operation} not allowed")]
    AccountNotActive {
        status: AccountStatus,
        operation: String,
    },

    /// The account changed between read and write
    #[error("Credit account {0} was modified concurrently")]
    ConcurrentModification(String),

    /// Money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Persistence failed; the whole operation did not happen
    #[error("Dependency error: {0}")]
    Dependency(#[source] PortError),
}

impl CreditError {
    pub fn validation(message: impl Into<String>) -> Self {
        CreditError::Validation(message.into())
    }

    pub fn not_active(status: AccountStatus, operation: impl Into<String>) -> Self {
        CreditError::AccountNotActive {
            status,
            operation: operation.into(),
        }
    }
}

impl From<PortError> for CreditError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => CreditError::AccountNotFound(id),
            PortError::Conflict { message } => CreditError::ConcurrentModification(message),
            PortError::Validation { message, .. } => CreditError::Validation(message),
            other => CreditError::Dependency(other),
        }
    }
}
