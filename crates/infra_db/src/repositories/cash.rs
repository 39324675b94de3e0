//! Daily operations repository implementation
//!
//! One row per branch and business date. The unique index
//! `uq_daily_operations_branch_date` makes the database the arbiter when
//! two registers open the same day.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const OPERATION_COLUMNS: &str = r#"
    id, branch_id, business_date, opening_mxn, opening_usd, closing_mxn, closing_usd,
    status, opened_by, closed_by, opened_at, closed_at, created_at, updated_at
"#;

/// Repository for daily cash operations
#[derive(Debug, Clone)]
pub struct DailyOperationRepository {
    pool: PgPool,
}

impl DailyOperationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the operation for a branch (or the single store) on a date
    pub async fn find_by_date(
        &self,
        branch_id: Option<Uuid>,
        business_date: NaiveDate,
    ) -> Result<Option<DailyOperationRow>, DatabaseError> {
        let row = sqlx::query_as::<_, DailyOperationRow>(&format!(
            r#"
            SELECT {OPERATION_COLUMNS}
            FROM daily_operations
            WHERE branch_id IS NOT DISTINCT FROM $1 AND business_date = $2
            "#
        ))
        .bind(branch_id)
        .bind(business_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Inserts an opened operation
    ///
    /// # Errors
    ///
    /// `DuplicateEntry` if the branch already has an operation that day
    pub async fn insert(&self, row: &DailyOperationRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO daily_operations (
                id, branch_id, business_date, opening_mxn, opening_usd, closing_mxn, closing_usd,
                status, opened_by, closed_by, opened_at, closed_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(row.id)
        .bind(row.branch_id)
        .bind(row.business_date)
        .bind(row.opening_mxn)
        .bind(row.opening_usd)
        .bind(row.closing_mxn)
        .bind(row.closing_usd)
        .bind(&row.status)
        .bind(&row.opened_by)
        .bind(&row.closed_by)
        .bind(row.opened_at)
        .bind(row.closed_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Records the closing count on a still-open operation
    ///
    /// # Errors
    ///
    /// * `NotFound` if the operation does not exist
    /// * `VersionConflict` if it is no longer open
    pub async fn close(&self, close: &CloseOperation) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE daily_operations
            SET status = 'closed', closing_mxn = $2, closing_usd = $3,
                closed_by = $4, closed_at = $5, updated_at = $5
            WHERE id = $1 AND status = 'open'
            "#,
        )
        .bind(close.id)
        .bind(close.closing_mxn)
        .bind(close.closing_usd)
        .bind(&close.closed_by)
        .bind(close.closed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM daily_operations WHERE id = $1)",
            )
            .bind(close.id)
            .fetch_one(&self.pool)
            .await?;

            return Err(if exists {
                DatabaseError::VersionConflict(format!("daily operation {} is not open", close.id))
            } else {
                DatabaseError::not_found("DailyOperation", close.id)
            });
        }
        Ok(())
    }

    /// Lists operations in an inclusive date range, newest first
    pub async fn list(
        &self,
        branch_id: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyOperationRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, DailyOperationRow>(&format!(
            r#"
            SELECT {OPERATION_COLUMNS}
            FROM daily_operations
            WHERE branch_id IS NOT DISTINCT FROM $1
              AND business_date BETWEEN $2 AND $3
            ORDER BY business_date DESC
            "#
        ))
        .bind(branch_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Database row for a daily operation
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyOperationRow {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub business_date: NaiveDate,
    pub opening_mxn: Decimal,
    pub opening_usd: Decimal,
    pub closing_mxn: Option<Decimal>,
    pub closing_usd: Option<Decimal>,
    pub status: String,
    pub opened_by: String,
    pub closed_by: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for closing an operation
#[derive(Debug, Clone)]
pub struct CloseOperation {
    pub id: Uuid,
    pub closing_mxn: Decimal,
    pub closing_usd: Decimal,
    pub closed_by: String,
    pub closed_at: DateTime<Utc>,
}
