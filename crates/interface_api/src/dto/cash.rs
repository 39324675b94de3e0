//! Cash register DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_cash::{DailyOperation, OperationStatus};

/// Drawer count for opening or closing the register
#[derive(Debug, Deserialize)]
pub struct CashCountBody {
    #[serde(default)]
    pub branch_id: Option<Uuid>,
    pub cash_mxn: Decimal,
    #[serde(default)]
    pub cash_usd: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct BranchParams {
    pub branch_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub branch_id: Option<Uuid>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct DailyOperationResponse {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub business_date: NaiveDate,
    pub status: OperationStatus,
    pub opening_mxn: Decimal,
    pub opening_usd: Decimal,
    pub closing_mxn: Option<Decimal>,
    pub closing_usd: Option<Decimal>,
    /// Closing minus opening, once closed
    pub movement_mxn: Option<Decimal>,
    pub movement_usd: Option<Decimal>,
    pub opened_by: String,
    pub closed_by: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<&DailyOperation> for DailyOperationResponse {
    fn from(op: &DailyOperation) -> Self {
        let movement = op.cash_movement();
        Self {
            id: op.id.into(),
            branch_id: op.branch_id.map(Uuid::from),
            business_date: op.business_date,
            status: op.status,
            opening_mxn: op.opening.mxn.amount(),
            opening_usd: op.opening.usd.amount(),
            closing_mxn: op.closing.map(|c| c.mxn.amount()),
            closing_usd: op.closing.map(|c| c.usd.amount()),
            movement_mxn: movement.map(|m| m.mxn.amount()),
            movement_usd: movement.map(|m| m.usd.amount()),
            opened_by: op.opened_by.clone(),
            closed_by: op.closed_by.clone(),
            opened_at: op.opened_at,
            closed_at: op.closed_at,
        }
    }
}

/// Today's register; `operation` is null before opening
#[derive(Debug, Serialize)]
pub struct CurrentOperationResponse {
    pub business_date: NaiveDate,
    pub operation: Option<DailyOperationResponse>,
}
