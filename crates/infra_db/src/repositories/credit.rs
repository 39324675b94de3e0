//! Credit ledger repository implementation
//!
//! Database access for credit accounts and their append-only transaction
//! trail. Balance updates are guarded by the account `version` column: an
//! update only applies when the stored version still equals the version the
//! caller read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const ACCOUNT_COLUMNS: &str = r#"
    a.id, a.customer_id, c.name AS customer_name, a.currency, a.credit_limit,
    a.current_balance, a.available_credit, a.status, a.payment_terms_days,
    a.interest_rate, a.notes, a.last_payment_at, a.created_at, a.updated_at, a.version
"#;

/// Accounts joined with their owning customer
const ACCOUNT_SOURCE: &str = "credit_accounts a JOIN customers c ON c.id = a.customer_id";

/// Repository for credit accounts and transactions
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: PgPool,
}

impl CreditRepository {
    /// Creates a new CreditRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a newly opened account
    pub async fn insert_account(&self, account: &NewCreditAccount) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO credit_accounts (
                id, customer_id, currency, credit_limit, current_balance, status,
                payment_terms_days, interest_rate, notes, last_payment_at,
                created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(account.id)
        .bind(account.customer_id)
        .bind(&account.currency)
        .bind(account.credit_limit)
        .bind(account.current_balance)
        .bind(&account.status)
        .bind(account.payment_terms_days)
        .bind(account.interest_rate)
        .bind(&account.notes)
        .bind(account.last_payment_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.version)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Retrieves an account by its identifier
    ///
    /// # Returns
    ///
    /// The account row or a `NotFound` error
    pub async fn get_account(&self, id: Uuid) -> Result<CreditAccountRow, DatabaseError> {
        sqlx::query_as::<_, CreditAccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM {ACCOUNT_SOURCE} WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("CreditAccount", id))
    }

    /// Finds accounts by optional customer, customer name fragment, and
    /// status, newest first
    pub async fn find_accounts(
        &self,
        filter: &AccountFilter<'_>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<CreditAccountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CreditAccountRow>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM {ACCOUNT_SOURCE}
            WHERE ($1::uuid IS NULL OR a.customer_id = $1)
              AND ($2::text IS NULL OR a.status = $2)
              AND ($3::text IS NULL OR c.name ILIKE '%' || $3 || '%')
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $4 OFFSET COALESCE($5, 0)
            "#
        ))
        .bind(filter.customer_id)
        .bind(filter.status)
        .bind(filter.customer_name.map(escape_like))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Sets a new status if the stored version still matches
    ///
    /// # Errors
    ///
    /// * `NotFound` if the account does not exist
    /// * `VersionConflict` if the account changed since it was read
    pub async fn update_status(
        &self,
        update: &AccountStatusUpdate,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE credit_accounts
            SET status = $2, updated_at = $3, version = $4
            WHERE id = $1 AND version = $5
            "#,
        )
        .bind(update.id)
        .bind(&update.status)
        .bind(update.updated_at)
        .bind(update.new_version)
        .bind(update.expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.explain_missed_update(update.id, update.expected_version).await);
        }
        Ok(())
    }

    /// Writes the new balance and appends the transaction in one database transaction
    ///
    /// The balance update is conditional on `expected_version`; if it matches
    /// no row the transaction is rolled back and nothing is written.
    pub async fn record_posting(
        &self,
        update: &AccountBalanceUpdate,
        entry: &NewCreditTransaction,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE credit_accounts
            SET current_balance = $2, last_payment_at = $3, updated_at = $4, version = $5
            WHERE id = $1 AND version = $6
            "#,
        )
        .bind(update.id)
        .bind(update.current_balance)
        .bind(update.last_payment_at)
        .bind(update.updated_at)
        .bind(update.new_version)
        .bind(update.expected_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(self.explain_missed_update(update.id, update.expected_version).await);
        }

        sqlx::query(
            r#"
            INSERT INTO credit_transactions (
                id, account_id, transaction_type, amount, description,
                reference, payment_method, created_at, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.id)
        .bind(entry.account_id)
        .bind(&entry.transaction_type)
        .bind(entry.amount)
        .bind(&entry.description)
        .bind(&entry.reference)
        .bind(&entry.payment_method)
        .bind(entry.created_at)
        .bind(&entry.created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Lists an account's transactions oldest first, with the account currency
    pub async fn list_transactions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<CreditTransactionRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CreditTransactionRow>(
            r#"
            SELECT
                t.id, t.account_id, t.transaction_type, t.amount, a.currency,
                t.description, t.reference, t.payment_method, t.created_at, t.created_by
            FROM credit_transactions t
            JOIN credit_accounts a ON a.id = t.account_id
            WHERE t.account_id = $1
            ORDER BY t.created_at ASC, t.id ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn explain_missed_update(&self, id: Uuid, expected_version: i64) -> DatabaseError {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM credit_accounts WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;

        match exists {
            Ok(false) => DatabaseError::not_found("CreditAccount", id),
            Ok(true) => DatabaseError::VersionConflict(format!(
                "credit account {id} is no longer at version {expected_version}"
            )),
            Err(e) => e.into(),
        }
    }
}

/// Escapes `LIKE` wildcards so a name fragment matches literally
fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Optional filters for listing accounts
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFilter<'a> {
    pub customer_id: Option<Uuid>,
    pub status: Option<&'a str>,
    /// Case-insensitive fragment of the customer's name
    pub customer_name: Option<&'a str>,
}

/// Database row for a credit account, joined with its customer's name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreditAccountRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub currency: String,
    pub credit_limit: Decimal,
    pub current_balance: Decimal,
    /// Generated column: `credit_limit - current_balance`
    pub available_credit: Decimal,
    pub status: String,
    pub payment_terms_days: i32,
    /// Percentage, e.g. 2.5 for 2.5%
    pub interest_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// Database row for a credit transaction, joined with its account currency
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreditTransactionRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_type: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub reference: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// Data for inserting an account
#[derive(Debug, Clone)]
pub struct NewCreditAccount {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub currency: String,
    pub credit_limit: Decimal,
    pub current_balance: Decimal,
    pub status: String,
    pub payment_terms_days: i32,
    pub interest_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// Conditional status change
#[derive(Debug, Clone)]
pub struct AccountStatusUpdate {
    pub id: Uuid,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub new_version: i64,
    pub expected_version: i64,
}

/// Conditional balance change
#[derive(Debug, Clone)]
pub struct AccountBalanceUpdate {
    pub id: Uuid,
    pub current_balance: Decimal,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub new_version: i64,
    pub expected_version: i64,
}

/// Data for appending a transaction
#[derive(Debug, Clone)]
pub struct NewCreditTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_type: String,
    pub amount: Decimal,
    pub description: String,
    pub reference: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_matches_wildcards_literally() {
        assert_eq!(escape_like("Doña Mari"), "Doña Mari");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
