//! Daily operation aggregate
//!
//! One cash drawer session per branch and business date. The lifecycle is
//! one-way: a session is opened with a count of the float and closed with
//! the end-of-day count ("corte Z"). A closed day stays closed.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{BranchId, Currency, DailyOperationId, Money};

use crate::error::CashError;

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Open,
    Closed,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Open => "open",
            OperationStatus::Closed => "closed",
        }
    }

    /// Checks if a status transition is valid
    pub fn can_transition_to(&self, target: OperationStatus) -> bool {
        matches!((self, target), (OperationStatus::Open, OperationStatus::Closed))
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationStatus {
    type Err = CashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(OperationStatus::Open),
            "closed" => Ok(OperationStatus::Closed),
            other => Err(CashError::validation(format!("unknown operation status '{other}'"))),
        }
    }
}

/// Physical count of the drawer in both accepted currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashCount {
    pub mxn: Money,
    pub usd: Money,
}

impl CashCount {
    /// Builds a validated count from plain amounts
    pub fn new(mxn: Decimal, usd: Decimal) -> Result<Self, CashError> {
        let count = Self {
            mxn: Money::mxn(mxn),
            usd: Money::usd(usd),
        };
        count.validate()?;
        Ok(count)
    }

    pub fn zero() -> Self {
        Self {
            mxn: Money::zero(Currency::MXN),
            usd: Money::zero(Currency::USD),
        }
    }

    /// Each slot in its own currency, non-negative, in whole cents
    pub fn validate(&self) -> Result<(), CashError> {
        for (slot, expected) in [(&self.mxn, Currency::MXN), (&self.usd, Currency::USD)] {
            slot.ensure_currency(expected)
                .and_then(|_| slot.ensure_currency_precision())
                .and_then(|_| slot.ensure_storable())
                .map_err(|e| CashError::validation(format!("{expected} count: {e}")))?;
            if slot.is_negative() {
                return Err(CashError::validation(format!(
                    "{expected} count must not be negative, got {}",
                    slot.amount()
                )));
            }
        }
        Ok(())
    }
}

/// Difference between closing and opening counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashMovement {
    pub mxn: Money,
    pub usd: Money,
}

/// A cash drawer session for one branch on one business date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyOperation {
    pub id: DailyOperationId,
    /// `None` for single-store setups
    pub branch_id: Option<BranchId>,
    pub business_date: NaiveDate,
    pub opening: CashCount,
    pub closing: Option<CashCount>,
    pub status: OperationStatus,
    pub opened_by: String,
    pub closed_by: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyOperation {
    /// Starts a session with the counted float
    pub fn open(
        branch_id: Option<BranchId>,
        business_date: NaiveDate,
        opening: CashCount,
        opened_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, CashError> {
        opening.validate()?;
        let opened_by = operator(opened_by.into())?;

        Ok(Self {
            id: DailyOperationId::new_v7(),
            branch_id,
            business_date,
            opening,
            closing: None,
            status: OperationStatus::Open,
            opened_by,
            closed_by: None,
            opened_at: now,
            closed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == OperationStatus::Open
    }

    /// Records the end-of-day count; irreversible
    pub fn close(
        &mut self,
        closing: CashCount,
        closed_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CashError> {
        if !self.status.can_transition_to(OperationStatus::Closed) {
            return Err(CashError::NotOpen {
                date: self.business_date,
            });
        }
        closing.validate()?;
        let closed_by = operator(closed_by.into())?;

        self.closing = Some(closing);
        self.closed_by = Some(closed_by);
        self.status = OperationStatus::Closed;
        self.closed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Closing minus opening per currency, once the day is closed
    pub fn cash_movement(&self) -> Option<CashMovement> {
        let closing = self.closing?;
        Some(CashMovement {
            mxn: Money::new(
                closing.mxn.amount().saturating_sub(self.opening.mxn.amount()),
                Currency::MXN,
            ),
            usd: Money::new(
                closing.usd.amount().saturating_sub(self.opening.usd.amount()),
                Currency::USD,
            ),
        })
    }
}

fn operator(name: String) -> Result<String, CashError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CashError::validation("operator name is required"));
    }
    Ok(trimmed.to_string())
}
