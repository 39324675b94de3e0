//! Core error types used across the system

use thiserror::Error;
use crate::clock::ClockError;

/// Kernel failures surfaced while wiring the application together
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),
}
