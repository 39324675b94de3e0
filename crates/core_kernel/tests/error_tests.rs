//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::ClockError;

#[test]
fn test_core_error_from_clock_error() {
    let core_error: CoreError = ClockError::UnknownTimezone("Nowhere/City".into()).into();

    assert!(matches!(core_error, CoreError::Clock(_)));
    assert!(core_error.to_string().contains("Nowhere/City"));
}
