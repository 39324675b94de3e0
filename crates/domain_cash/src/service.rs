//! Cash register application service
//!
//! State machine per branch and business date:
//!
//! ```text
//! NONE ──open──▶ OPEN ──close──▶ CLOSED
//! ```
//!
//! The business date is taken from the store calendar at call time, so a
//! session opened at 23:00 local belongs to that local day even when UTC has
//! already rolled over.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use core_kernel::{BranchId, BusinessCalendar, Clock};

use crate::error::CashError;
use crate::operation::{CashCount, DailyOperation};
use crate::ports::DailyOperationPort;

/// Maximum span of a history query, in days
pub const MAX_HISTORY_DAYS: i64 = 366;

/// Entry point for register open/close
pub struct CashRegisterService {
    operations: Arc<dyn DailyOperationPort>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
}

impl CashRegisterService {
    pub fn new(
        operations: Arc<dyn DailyOperationPort>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            operations,
            clock,
            calendar,
        }
    }

    /// Today's business date in the store calendar
    pub fn today(&self) -> NaiveDate {
        self.calendar.business_date(self.clock.now())
    }

    /// Opens today's register with the counted float
    ///
    /// # Errors
    ///
    /// * `CashError::AlreadyOpen` if today's register is open
    /// * `CashError::DayAlreadyClosed` if today's register was already closed
    /// * `CashError::Validation` for negative or malformed counts
    #[instrument(skip(self, opening))]
    pub async fn open(
        &self,
        branch_id: Option<BranchId>,
        opening: CashCount,
        operator: &str,
    ) -> Result<DailyOperation, CashError> {
        let now = self.clock.now();
        let date = self.calendar.business_date(now);

        if let Some(existing) = self.operations.find_by_date(branch_id, date).await? {
            return Err(already_exists(&existing));
        }

        let operation = DailyOperation::open(branch_id, date, opening, operator, now)?;
        match self.operations.insert(&operation).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                // Lost the race to another register
                warn!(%date, "concurrent open rejected");
                return match self.operations.find_by_date(branch_id, date).await? {
                    Some(existing) => Err(already_exists(&existing)),
                    None => Err(CashError::AlreadyOpen { date }),
                };
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            operation_id = %operation.id,
            %date,
            opening_mxn = %operation.opening.mxn.amount(),
            opening_usd = %operation.opening.usd.amount(),
            operator,
            "cash register opened"
        );
        Ok(operation)
    }

    /// Closes today's register with the end-of-day count (corte Z)
    ///
    /// # Errors
    ///
    /// `CashError::NotOpen` if there is no open register today.
    #[instrument(skip(self, closing))]
    pub async fn close(
        &self,
        branch_id: Option<BranchId>,
        closing: CashCount,
        operator: &str,
    ) -> Result<DailyOperation, CashError> {
        let now = self.clock.now();
        let date = self.calendar.business_date(now);

        let mut operation = self
            .operations
            .find_by_date(branch_id, date)
            .await?
            .ok_or(CashError::NotOpen { date })?;
        operation.close(closing, operator, now)?;

        match self.operations.close(&operation).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() || e.is_not_found() => return Err(CashError::NotOpen { date }),
            Err(e) => return Err(e.into()),
        }

        if let Some(movement) = operation.cash_movement() {
            info!(
                operation_id = %operation.id,
                %date,
                movement_mxn = %movement.mxn.amount(),
                movement_usd = %movement.usd.amount(),
                operator,
                "cash register closed"
            );
        }
        Ok(operation)
    }

    /// Today's operation in any state, if one exists
    pub async fn get_current(&self, branch_id: Option<BranchId>) -> Result<Option<DailyOperation>, CashError> {
        Ok(self.operations.find_by_date(branch_id, self.today()).await?)
    }

    /// Past operations in an inclusive date range, newest first
    pub async fn history(
        &self,
        branch_id: Option<BranchId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyOperation>, CashError> {
        if from > to {
            return Err(CashError::validation(format!("range start {from} is after end {to}")));
        }
        if (to - from).num_days() > MAX_HISTORY_DAYS {
            return Err(CashError::validation(format!(
                "range may span at most {MAX_HISTORY_DAYS} days"
            )));
        }
        Ok(self.operations.list(branch_id, from, to).await?)
    }
}

fn already_exists(existing: &DailyOperation) -> CashError {
    if existing.is_open() {
        CashError::AlreadyOpen {
            date: existing.business_date,
        }
    } else {
        CashError::DayAlreadyClosed {
            date: existing.business_date,
        }
    }
}
