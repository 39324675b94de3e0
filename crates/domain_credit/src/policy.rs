//! Store-wide credit settings

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use core_kernel::Currency;

/// Settings applied to every account in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPolicy {
    /// Currency all credit accounts are kept in
    pub currency: Currency,
    /// Fraction of the limit above which a near-limit warning is raised
    pub near_limit_threshold: Decimal,
    /// Upper bound for a single customer notification
    pub notification_timeout: Duration,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            currency: Currency::MXN,
            near_limit_threshold: dec!(0.8),
            notification_timeout: Duration::from_secs(5),
        }
    }
}

impl CreditPolicy {
    pub fn with_near_limit_threshold(mut self, threshold: Decimal) -> Self {
        self.near_limit_threshold = threshold;
        self
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }
}
