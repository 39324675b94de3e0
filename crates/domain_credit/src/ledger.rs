//! Posting rules for the credit ledger
//!
//! Every balance change goes through [`PostingRules::apply`], which takes the
//! current account snapshot and a request and returns the next snapshot plus
//! the transaction that explains it. Nothing is mutated in place: a rejected
//! request leaves the caller's account untouched, and a successful one is
//! persisted as a single unit (balance update and transaction insert).
//!
//! # Sign convention
//!
//! - Charges are stored with a positive amount
//! - Payments are stored with a negative amount
//! - Adjustments keep the sign the operator gave them
//!
//! so that `balance == Σ transaction.amount` holds for every account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use core_kernel::{CreditTransactionId, Money};

use crate::account::CreditAccount;
use crate::error::CreditError;
use crate::policy::CreditPolicy;
use crate::transaction::{payment_reference, CreditTransaction, TransactionKind};

/// Default description for payments recorded without notes
pub const DEFAULT_PAYMENT_DESCRIPTION: &str = "Pago de crédito";

/// Purchase on credit
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: Money,
    pub description: String,
    pub reference: Option<String>,
}

/// Customer payment against the balance
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount: Money,
    pub payment_method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Signed manual correction
#[derive(Debug, Clone)]
pub struct AdjustmentRequest {
    pub amount: Money,
    pub description: String,
    pub reference: Option<String>,
}

/// Any request that moves a balance
#[derive(Debug, Clone)]
pub enum PostingRequest {
    Charge(ChargeRequest),
    Payment(PaymentRequest),
    Adjustment(AdjustmentRequest),
}

impl PostingRequest {
    pub fn kind(&self) -> TransactionKind {
        match self {
            PostingRequest::Charge(_) => TransactionKind::Charge,
            PostingRequest::Payment(_) => TransactionKind::Payment,
            PostingRequest::Adjustment(_) => TransactionKind::Adjustment,
        }
    }
}

/// Non-fatal conditions attached to a successful operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerWarning {
    /// Balance is above the near-limit threshold of the credit limit
    NearLimit { balance: Decimal, credit_limit: Decimal },
    /// Balance exceeds the credit limit
    OverLimit { balance: Decimal, credit_limit: Decimal },
    /// Customer notification could not be delivered
    NotificationFailed { reason: String },
}

impl fmt::Display for LedgerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerWarning::NearLimit { balance, credit_limit } => {
                write!(f, "balance {balance} is near the credit limit {credit_limit}")
            }
            LedgerWarning::OverLimit { balance, credit_limit } => {
                write!(f, "balance {balance} exceeds the credit limit {credit_limit}")
            }
            LedgerWarning::NotificationFailed { reason } => {
                write!(f, "customer notification failed: {reason}")
            }
        }
    }
}

/// The result of applying a request: next account state and its ledger row
#[derive(Debug, Clone)]
pub struct Posting {
    /// Account after the posting, with its version bumped
    pub account: CreditAccount,
    /// Version the stored account must still have for the write to succeed
    pub expected_version: i64,
    /// The appended transaction
    pub transaction: CreditTransaction,
    /// Limit warnings raised by the new balance
    pub warnings: Vec<LedgerWarning>,
}

/// Pure balance rules, parameterized by the store policy
#[derive(Debug, Clone, Default)]
pub struct PostingRules {
    policy: CreditPolicy,
}

impl PostingRules {
    pub fn new(policy: CreditPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    /// Applies a posting request to an account snapshot
    ///
    /// # Arguments
    ///
    /// * `account` - Current stored state of the account
    /// * `request` - The charge, payment, or adjustment to apply
    /// * `operator` - Who is recording the entry
    /// * `now` - Timestamp for the transaction and the account update
    ///
    /// # Errors
    ///
    /// * `CreditError::Validation` for non-positive amounts, zero adjustments,
    ///   sub-cent precision, foreign currency, or empty descriptions
    /// * `CreditError::AccountNotActive` when the status forbids the posting
    /// * `CreditError::InvalidAmount` when a credit exceeds the balance
    pub fn apply(
        &self,
        account: &CreditAccount,
        request: PostingRequest,
        operator: &str,
        now: DateTime<Utc>,
    ) -> Result<Posting, CreditError> {
        let (kind, signed, description, reference, payment_method) = match request {
            PostingRequest::Charge(charge) => {
                self.check_amount(account, &charge.amount)?;
                if !charge.amount.is_positive() {
                    return Err(CreditError::validation("charge amount must be greater than zero"));
                }
                if !account.status.accepts_charges() {
                    return Err(CreditError::not_active(account.status, "charge"));
                }
                (
                    TransactionKind::Charge,
                    charge.amount,
                    required_text(charge.description, "description")?,
                    non_empty(charge.reference),
                    None,
                )
            }
            PostingRequest::Payment(payment) => {
                self.check_amount(account, &payment.amount)?;
                if !payment.amount.is_positive() {
                    return Err(CreditError::validation("payment amount must be greater than zero"));
                }
                if !account.status.accepts_credits() {
                    return Err(CreditError::not_active(account.status, "payment"));
                }
                let method = required_text(payment.payment_method, "payment method")?;
                let description = non_empty(payment.notes)
                    .unwrap_or_else(|| DEFAULT_PAYMENT_DESCRIPTION.to_string());
                let reference = non_empty(payment.reference).or_else(|| Some(payment_reference(now)));
                (
                    TransactionKind::Payment,
                    -payment.amount,
                    description,
                    reference,
                    Some(method),
                )
            }
            PostingRequest::Adjustment(adjustment) => {
                self.check_amount(account, &adjustment.amount)?;
                if adjustment.amount.is_zero() {
                    return Err(CreditError::validation("adjustment amount must not be zero"));
                }
                if !account.status.accepts_credits() {
                    return Err(CreditError::not_active(account.status, "adjustment"));
                }
                (
                    TransactionKind::Adjustment,
                    adjustment.amount,
                    required_text(adjustment.description, "description")?,
                    non_empty(adjustment.reference),
                    None,
                )
            }
        };

        let new_balance = account
            .current_balance
            .checked_add(&signed)
            .and_then(|balance| balance.ensure_storable().map(|_| balance))
            .map_err(|e| CreditError::validation(format!("resulting balance: {e}")))?;
        if new_balance.is_negative() {
            return Err(CreditError::InvalidAmount {
                requested: signed.amount().abs(),
                balance: account.current_balance.amount(),
            });
        }

        let mut next = account.clone();
        next.current_balance = new_balance;
        next.updated_at = now;
        next.version = account.version + 1;
        if kind == TransactionKind::Payment {
            next.last_payment_at = Some(now);
        }

        let transaction = CreditTransaction {
            id: CreditTransactionId::new_v7(),
            account_id: account.id,
            kind,
            amount: signed,
            description,
            reference,
            payment_method,
            created_at: now,
            created_by: operator.to_string(),
        };

        let warnings = self.limit_warnings(&next, kind);
        debug!(
            account_id = %account.id,
            kind = %kind,
            amount = %signed.amount(),
            balance = %new_balance.amount(),
            "posting computed"
        );

        Ok(Posting {
            account: next,
            expected_version: account.version,
            transaction,
            warnings,
        })
    }

    /// Limit warnings for an account state reached by a posting of `kind`
    ///
    /// Over-limit is only flagged for debits; a payment can leave the account
    /// over its limit but it never puts it there.
    pub fn limit_warnings(&self, account: &CreditAccount, kind: TransactionKind) -> Vec<LedgerWarning> {
        let balance = account.current_balance.amount();
        let credit_limit = account.credit_limit.amount();
        let mut warnings = Vec::new();

        if account.is_over_limit() && kind != TransactionKind::Payment {
            warnings.push(LedgerWarning::OverLimit { balance, credit_limit });
        } else if account.is_near_limit(self.policy.near_limit_threshold) {
            warnings.push(LedgerWarning::NearLimit { balance, credit_limit });
        }
        warnings
    }

    fn check_amount(&self, account: &CreditAccount, amount: &Money) -> Result<(), CreditError> {
        amount
            .ensure_currency(account.currency)
            .and_then(|_| amount.ensure_currency_precision())
            .and_then(|_| amount.ensure_storable())
            .map_err(|e| CreditError::validation(e.to_string()))
    }
}

/// Outcome of checking an account against its transaction history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Balanced,
    Mismatch { stored: Decimal, ledger: Decimal },
}

impl Reconciliation {
    pub fn is_balanced(&self) -> bool {
        matches!(self, Reconciliation::Balanced)
    }
}

/// Verifies that the stored balance equals the sum of the ledger
pub fn reconcile<'a, I>(account: &CreditAccount, transactions: I) -> Result<Reconciliation, CreditError>
where
    I: IntoIterator<Item = &'a CreditTransaction>,
{
    let amounts = transactions.into_iter().map(|t| &t.amount);
    let ledger = Money::sum(amounts, account.currency)?;
    if ledger == account.current_balance {
        Ok(Reconciliation::Balanced)
    } else {
        Ok(Reconciliation::Mismatch {
            stored: account.current_balance.amount(),
            ledger: ledger.amount(),
        })
    }
}

fn required_text(value: String, field: &str) -> Result<String, CreditError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CreditError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
