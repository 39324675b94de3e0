//! Credit transaction types
//!
//! Transactions are immutable and append-only. Charges carry a positive
//! amount and payments a negative one, so the ordered sum of an account's
//! transactions is its balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CreditAccountId, CreditTransactionId, Money};

use crate::error::CreditError;

/// Kind of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Purchase on credit (positive)
    Charge,
    /// Customer payment (negative)
    Payment,
    /// Manual correction (either sign)
    Adjustment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Charge => "charge",
            TransactionKind::Payment => "payment",
            TransactionKind::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "charge" => Ok(TransactionKind::Charge),
            "payment" => Ok(TransactionKind::Payment),
            "adjustment" => Ok(TransactionKind::Adjustment),
            other => Err(CreditError::validation(format!("unknown transaction kind '{other}'"))),
        }
    }
}

/// A single entry in an account's ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTransaction {
    /// Unique identifier (time-ordered)
    pub id: CreditTransactionId,
    /// Owning account
    pub account_id: CreditAccountId,
    /// Entry kind
    pub kind: TransactionKind,
    /// Signed amount: positive increases the balance
    pub amount: Money,
    /// Description shown on statements
    pub description: String,
    /// External reference (ticket number, receipt, transfer id)
    pub reference: Option<String>,
    /// Payment method for payments
    pub payment_method: Option<String>,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
    /// Operator who recorded it
    pub created_by: String,
}

impl CreditTransaction {
    /// Returns true if the entry increases what the customer owes
    pub fn is_debit(&self) -> bool {
        self.amount.is_positive()
    }

    /// Returns true if the entry reduces what the customer owes
    pub fn is_credit(&self) -> bool {
        self.amount.is_negative()
    }
}

/// Generates a receipt reference for a payment without one
pub fn payment_reference(now: DateTime<Utc>) -> String {
    format!("PAY-{}", now.timestamp_millis())
}
