//! Store-wide credit aggregates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};

use crate::account::{AccountStatus, CreditAccount};

/// Totals across a set of credit accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub account_count: usize,
    pub active_count: usize,
    pub suspended_count: usize,
    pub total_credit_limit: Money,
    pub total_outstanding: Money,
    pub total_available: Money,
    /// `total_outstanding / total_credit_limit`, zero when there is no limit
    pub utilization: Decimal,
    pub over_limit_count: usize,
    pub near_limit_count: usize,
}

impl PortfolioSummary {
    /// Aggregates the given accounts
    ///
    /// Closed accounts count toward `account_count` only; their limits are no
    /// longer extended credit.
    pub fn from_accounts<'a, I>(
        accounts: I,
        currency: Currency,
        near_limit_threshold: Decimal,
    ) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = &'a CreditAccount>,
    {
        let mut summary = Self {
            account_count: 0,
            active_count: 0,
            suspended_count: 0,
            total_credit_limit: Money::zero(currency),
            total_outstanding: Money::zero(currency),
            total_available: Money::zero(currency),
            utilization: Decimal::ZERO,
            over_limit_count: 0,
            near_limit_count: 0,
        };

        for account in accounts {
            summary.account_count += 1;
            match account.status {
                AccountStatus::Active => summary.active_count += 1,
                AccountStatus::Suspended => summary.suspended_count += 1,
                AccountStatus::Closed => continue,
            }

            summary.total_credit_limit = summary.total_credit_limit.checked_add(&account.credit_limit)?;
            summary.total_outstanding = summary.total_outstanding.checked_add(&account.current_balance)?;

            if account.is_over_limit() {
                summary.over_limit_count += 1;
            } else if account.is_near_limit(near_limit_threshold) {
                summary.near_limit_count += 1;
            }
        }

        summary.total_available = summary.total_credit_limit.checked_sub(&summary.total_outstanding)?;
        summary.utilization = match summary.total_outstanding.ratio_to(&summary.total_credit_limit) {
            Ok(ratio) => ratio.round_dp(4),
            Err(MoneyError::DivisionByZero) => Decimal::ZERO,
            Err(e) => return Err(e),
        };
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::OpenAccountRequest;
    use chrono::Utc;
    use core_kernel::CustomerId;
    use rust_decimal_macros::dec;

    fn account(limit: Decimal, balance: Decimal) -> CreditAccount {
        let mut account = CreditAccount::open(
            OpenAccountRequest {
                customer_id: CustomerId::new(),
                credit_limit: Money::mxn(limit),
                payment_terms_days: 30,
                notes: None,
                interest_rate: None,
            },
            Currency::MXN,
            Utc::now(),
        )
        .unwrap();
        account.current_balance = Money::mxn(balance);
        account
    }

    #[test]
    fn test_empty_portfolio_has_zero_utilization() {
        let summary = PortfolioSummary::from_accounts([], Currency::MXN, dec!(0.8)).unwrap();
        assert_eq!(summary.account_count, 0);
        assert_eq!(summary.utilization, Decimal::ZERO);
    }

    #[test]
    fn test_totals_and_flags() {
        let accounts = vec![
            account(dec!(50000), dec!(42000)),
            account(dec!(50000), dec!(40000)),
            account(dec!(1000), dec!(1500)),
        ];
        let summary = PortfolioSummary::from_accounts(&accounts, Currency::MXN, dec!(0.8)).unwrap();

        assert_eq!(summary.total_credit_limit.amount(), dec!(101000));
        assert_eq!(summary.total_outstanding.amount(), dec!(83500));
        assert_eq!(summary.total_available.amount(), dec!(17500));
        assert_eq!(summary.over_limit_count, 1);
        assert_eq!(summary.near_limit_count, 1);
        assert_eq!(summary.utilization, dec!(0.8267));
    }
}
