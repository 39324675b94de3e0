//! PostgreSQL Daily Operation Adapter

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    BranchId, DomainPort, HealthCheckResult, HealthCheckable, Money, PortError,
};
use domain_cash::{CashCount, DailyOperation, DailyOperationPort, OperationStatus};

use crate::adapters::{decode_error, ping};
use crate::repositories::cash::{CloseOperation, DailyOperationRepository, DailyOperationRow};

const ADAPTER_ID: &str = "postgres-daily-operations";

/// PostgreSQL-backed implementation of `DailyOperationPort`
#[derive(Debug, Clone)]
pub struct PostgresDailyOperationAdapter {
    repository: DailyOperationRepository,
    pool: PgPool,
}

impl PostgresDailyOperationAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DailyOperationRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresDailyOperationAdapter {}

#[async_trait]
impl HealthCheckable for PostgresDailyOperationAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl DailyOperationPort for PostgresDailyOperationAdapter {
    #[instrument(skip(self))]
    async fn find_by_date(
        &self,
        branch_id: Option<BranchId>,
        business_date: NaiveDate,
    ) -> Result<Option<DailyOperation>, PortError> {
        self.repository
            .find_by_date(branch_id.map(Uuid::from), business_date)
            .await?
            .map(operation_from_row)
            .transpose()
    }

    #[instrument(skip(self, operation), fields(operation_id = %operation.id, date = %operation.business_date))]
    async fn insert(&self, operation: &DailyOperation) -> Result<(), PortError> {
        self.repository
            .insert(&operation_row(operation))
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self, operation), fields(operation_id = %operation.id))]
    async fn close(&self, operation: &DailyOperation) -> Result<(), PortError> {
        let (closing, closed_by, closed_at) = match (&operation.closing, &operation.closed_by, operation.closed_at) {
            (Some(closing), Some(closed_by), Some(closed_at)) => (closing, closed_by, closed_at),
            _ => {
                return Err(PortError::validation(format!(
                    "daily operation {} has no closing count",
                    operation.id
                )))
            }
        };

        let close = CloseOperation {
            id: operation.id.into(),
            closing_mxn: closing.mxn.amount(),
            closing_usd: closing.usd.amount(),
            closed_by: closed_by.clone(),
            closed_at,
        };
        self.repository.close(&close).await.map_err(Into::into)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        branch_id: Option<BranchId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyOperation>, PortError> {
        self.repository
            .list(branch_id.map(Uuid::from), from, to)
            .await?
            .into_iter()
            .map(operation_from_row)
            .collect()
    }
}

fn operation_row(operation: &DailyOperation) -> DailyOperationRow {
    DailyOperationRow {
        id: operation.id.into(),
        branch_id: operation.branch_id.map(Uuid::from),
        business_date: operation.business_date,
        opening_mxn: operation.opening.mxn.amount(),
        opening_usd: operation.opening.usd.amount(),
        closing_mxn: operation.closing.map(|c| c.mxn.amount()),
        closing_usd: operation.closing.map(|c| c.usd.amount()),
        status: operation.status.as_str().to_string(),
        opened_by: operation.opened_by.clone(),
        closed_by: operation.closed_by.clone(),
        opened_at: operation.opened_at,
        closed_at: operation.closed_at,
        created_at: operation.created_at,
        updated_at: operation.updated_at,
    }
}

fn operation_from_row(row: DailyOperationRow) -> Result<DailyOperation, PortError> {
    let status: OperationStatus = row.status.parse().map_err(|e| decode_error("status", e))?;
    let closing = match (row.closing_mxn, row.closing_usd) {
        (Some(mxn), Some(usd)) => Some(CashCount {
            mxn: Money::mxn(mxn),
            usd: Money::usd(usd),
        }),
        (None, None) => None,
        _ => return Err(decode_error("closing_mxn", "closing count is only partially stored")),
    };

    Ok(DailyOperation {
        id: row.id.into(),
        branch_id: row.branch_id.map(BranchId::from),
        business_date: row.business_date,
        opening: CashCount {
            mxn: Money::mxn(row.opening_mxn),
            usd: Money::usd(row.opening_usd),
        },
        closing,
        status,
        opened_by: row.opened_by,
        closed_by: row.closed_by,
        opened_at: row.opened_at,
        closed_at: row.closed_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
