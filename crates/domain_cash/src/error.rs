//! Cash register errors

use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the cash register domain
#[derive(Debug, Error)]
pub enum CashError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cash register already open for {date}")]
    AlreadyOpen { date: NaiveDate },

    #[error("No open cash register for {date}")]
    NotOpen { date: NaiveDate },

    #[error("Cash register for {date} was already closed")]
    DayAlreadyClosed { date: NaiveDate },

    #[error("Dependency error: {0}")]
    Dependency(#[source] PortError),
}

impl CashError {
    pub fn validation(message: impl Into<String>) -> Self {
        CashError::Validation(message.into())
    }
}

impl From<PortError> for CashError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Validation { message, .. } => CashError::Validation(message),
            other => CashError::Dependency(other),
        }
    }
}
