//! Credit account aggregate
//!
//! A revolving store credit line for one customer. The balance only moves
//! through the posting rules in [`crate::ledger`]; available credit is always
//! derived from limit and balance.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CreditAccountId, Currency, CustomerId, Money, Rate};

use crate::error::CreditError;

/// Lifecycle status of a credit account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Accepts charges, payments, and adjustments
    Active,
    /// Frozen for new charges; still accepts payments and adjustments
    Suspended,
    /// Logical end of life; accepts nothing
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Closed => "closed",
        }
    }

    /// Returns true if new charges may be posted
    pub fn accepts_charges(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }

    /// Returns true if payments and adjustments may be posted
    pub fn accepts_credits(&self) -> bool {
        matches!(self, AccountStatus::Active | AccountStatus::Suspended)
    }

    /// Checks if a status transition is valid
    pub fn can_transition_to(&self, target: AccountStatus) -> bool {
        matches!(
            (self, target),
            (AccountStatus::Active, AccountStatus::Suspended)
                | (AccountStatus::Active, AccountStatus::Closed)
                | (AccountStatus::Suspended, AccountStatus::Active)
                | (AccountStatus::Suspended, AccountStatus::Closed)
        )
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "suspended" => Ok(AccountStatus::Suspended),
            "closed" => Ok(AccountStatus::Closed),
            other => Err(CreditError::validation(format!("unknown account status '{other}'"))),
        }
    }
}

/// Days the customer has to settle a charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PaymentTerms {
    Days15,
    Days30,
    Days45,
    Days60,
    Days90,
}

impl PaymentTerms {
    pub const ALLOWED: [u32; 5] = [15, 30, 45, 60, 90];

    pub fn days(&self) -> u32 {
        match self {
            PaymentTerms::Days15 => 15,
            PaymentTerms::Days30 => 30,
            PaymentTerms::Days45 => 45,
            PaymentTerms::Days60 => 60,
            PaymentTerms::Days90 => 90,
        }
    }

    /// Date a charge made on `from` falls due
    pub fn due_date(&self, from: NaiveDate) -> NaiveDate {
        from + Duration::days(i64::from(self.days()))
    }
}

impl TryFrom<u32> for PaymentTerms {
    type Error = CreditError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            15 => Ok(PaymentTerms::Days15),
            30 => Ok(PaymentTerms::Days30),
            45 => Ok(PaymentTerms::Days45),
            60 => Ok(PaymentTerms::Days60),
            90 => Ok(PaymentTerms::Days90),
            other => Err(CreditError::validation(format!(
                "payment terms must be one of {:?} days, got {other}",
                Self::ALLOWED
            ))),
        }
    }
}

impl From<PaymentTerms> for u32 {
    fn from(terms: PaymentTerms) -> u32 {
        terms.days()
    }
}

impl fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

/// Request to open a new credit line
#[derive(Debug, Clone)]
pub struct OpenAccountRequest {
    pub customer_id: CustomerId,
    pub credit_limit: Money,
    pub payment_terms_days: u32,
    pub notes: Option<String>,
    /// Interest rate as a percentage (e.g., 2.5 for 2.5%)
    pub interest_rate: Option<Decimal>,
}

/// A customer's revolving credit account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAccount {
    /// Unique identifier
    pub id: CreditAccountId,
    /// Owning customer
    pub customer_id: CustomerId,
    /// Customer's display name as of the last read; not written back
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Ledger currency
    pub currency: Currency,
    /// Credit limit, strictly positive
    pub credit_limit: Money,
    /// Amount currently owed, never negative
    pub current_balance: Money,
    /// Status
    pub status: AccountStatus,
    /// Payment terms
    pub payment_terms: PaymentTerms,
    /// Stored interest rate (not accrued)
    pub interest_rate: Option<Rate>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Last time a payment was received
    pub last_payment_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every write
    pub version: i64,
}

impl CreditAccount {
    /// Opens a new account with zero balance
    ///
    /// # Errors
    ///
    /// Returns `CreditError::Validation` if the limit is not positive, carries
    /// sub-cent precision, exceeds `Money::MAX_AMOUNT`, or is in the wrong currency; if the terms are not
    /// an allowed value; or if the interest rate is outside 0-100%.
    pub fn open(
        request: OpenAccountRequest,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Result<Self, CreditError> {
        let limit = request.credit_limit;
        if limit.currency() != currency {
            return Err(CreditError::validation(format!(
                "credit limit must be in {currency}, got {}",
                limit.currency()
            )));
        }
        if !limit.is_positive() {
            return Err(CreditError::validation("credit limit must be greater than zero"));
        }
        limit
            .ensure_currency_precision()
            .and_then(|_| limit.ensure_storable())
            .map_err(|e| CreditError::validation(e.to_string()))?;

        let payment_terms = PaymentTerms::try_from(request.payment_terms_days)?;

        let interest_rate = match request.interest_rate {
            Some(pct) => {
                let rate = Rate::from_percentage(pct);
                if !rate.is_within_unit_interval() {
                    return Err(CreditError::validation(format!(
                        "interest rate must be between 0 and 100 percent, got {pct}"
                    )));
                }
                Some(rate)
            }
            None => None,
        };

        Ok(Self {
            id: CreditAccountId::new_v7(),
            customer_id: request.customer_id,
            customer_name: None,
            currency,
            credit_limit: limit,
            current_balance: Money::zero(currency),
            status: AccountStatus::Active,
            payment_terms,
            interest_rate,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            last_payment_at: None,
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    /// Limit minus balance; negative when over the limit
    pub fn available_credit(&self) -> Money {
        Money::new(
            self.credit_limit
                .amount()
                .saturating_sub(self.current_balance.amount()),
            self.currency,
        )
    }

    /// Returns true if the balance exceeds the limit
    pub fn is_over_limit(&self) -> bool {
        self.current_balance.amount() > self.credit_limit.amount()
    }

    /// Balance as a fraction of the limit
    pub fn utilization(&self) -> Decimal {
        if self.credit_limit.is_zero() {
            return Decimal::ZERO;
        }
        self.current_balance.amount() / self.credit_limit.amount()
    }

    /// Returns true if the balance is strictly above `threshold * limit`
    pub fn is_near_limit(&self, threshold: Decimal) -> bool {
        self.current_balance.amount() > self.credit_limit.amount() * threshold
    }

    /// Moves the account to a new status
    ///
    /// Closing requires a settled (zero) balance.
    pub fn transition_to(
        &mut self,
        target: AccountStatus,
        now: DateTime<Utc>,
    ) -> Result<(), CreditError> {
        if !self.status.can_transition_to(target) {
            return Err(CreditError::not_active(
                self.status,
                format!("transition to {target}"),
            ));
        }
        if target == AccountStatus::Closed && !self.current_balance.is_zero() {
            return Err(CreditError::validation(format!(
                "cannot close account with outstanding balance {}",
                self.current_balance
            )));
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}
