//! PostgreSQL Credit Ledger Adapter
//!
//! Implements `CreditLedgerPort` with the `CreditRepository`. Postings are
//! written in a single database transaction: the conditional balance update
//! and the transaction insert commit together or not at all.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    CreditAccountId, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money, PortError,
    Rate,
};
use domain_credit::{
    AccountQuery, AccountStatus, CreditAccount, CreditLedgerPort, CreditTransaction, PaymentTerms,
    Posting, TransactionKind,
};

use crate::adapters::{decode_error, ping};
use crate::repositories::credit::{
    AccountBalanceUpdate, AccountFilter, AccountStatusUpdate, CreditAccountRow, CreditRepository,
    CreditTransactionRow, NewCreditAccount, NewCreditTransaction,
};

const ADAPTER_ID: &str = "postgres-credit-ledger";

/// PostgreSQL-backed implementation of `CreditLedgerPort`
#[derive(Debug, Clone)]
pub struct PostgresCreditLedgerAdapter {
    repository: CreditRepository,
    pool: PgPool,
}

impl PostgresCreditLedgerAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CreditRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &CreditRepository {
        &self.repository
    }
}

impl DomainPort for PostgresCreditLedgerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCreditLedgerAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl CreditLedgerPort for PostgresCreditLedgerAdapter {
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn insert_account(&self, account: &CreditAccount) -> Result<(), PortError> {
        self.repository
            .insert_account(&new_account_row(account))
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn get_account(&self, id: CreditAccountId) -> Result<CreditAccount, PortError> {
        let row = self.repository.get_account(id.into()).await?;
        account_from_row(row)
    }

    #[instrument(skip(self))]
    async fn find_accounts(&self, query: AccountQuery) -> Result<Vec<CreditAccount>, PortError> {
        debug!(?query, "Finding credit accounts");
        let rows = self
            .repository
            .find_accounts(
                &AccountFilter {
                    customer_id: query.customer_id.map(Uuid::from),
                    status: query.status.map(|s| s.as_str()),
                    customer_name: query
                        .customer_name
                        .as_deref()
                        .map(str::trim)
                        .filter(|name| !name.is_empty()),
                },
                query.limit.map(i64::from),
                query.offset.map(i64::from),
            )
            .await?;
        rows.into_iter().map(account_from_row).collect()
    }

    #[instrument(skip(self, account), fields(account_id = %account.id, status = %account.status))]
    async fn update_status(
        &self,
        account: &CreditAccount,
        expected_version: i64,
    ) -> Result<(), PortError> {
        let update = AccountStatusUpdate {
            id: account.id.into(),
            status: account.status.as_str().to_string(),
            updated_at: account.updated_at,
            new_version: account.version,
            expected_version,
        };
        self.repository.update_status(&update).await.map_err(Into::into)
    }

    #[instrument(
        skip(self, posting),
        fields(
            account_id = %posting.account.id,
            transaction_id = %posting.transaction.id,
            kind = %posting.transaction.kind
        )
    )]
    async fn record_posting(&self, posting: &Posting) -> Result<(), PortError> {
        let account = &posting.account;
        let tx = &posting.transaction;

        let update = AccountBalanceUpdate {
            id: account.id.into(),
            current_balance: account.current_balance.amount(),
            last_payment_at: account.last_payment_at,
            updated_at: account.updated_at,
            new_version: account.version,
            expected_version: posting.expected_version,
        };
        let entry = NewCreditTransaction {
            id: tx.id.into(),
            account_id: tx.account_id.into(),
            transaction_type: tx.kind.as_str().to_string(),
            amount: tx.amount.amount(),
            description: tx.description.clone(),
            reference: tx.reference.clone(),
            payment_method: tx.payment_method.clone(),
            created_at: tx.created_at,
            created_by: tx.created_by.clone(),
        };

        self.repository
            .record_posting(&update, &entry)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn list_transactions(
        &self,
        account_id: CreditAccountId,
    ) -> Result<Vec<CreditTransaction>, PortError> {
        let rows = self.repository.list_transactions(account_id.into()).await?;
        rows.into_iter().map(transaction_from_row).collect()
    }
}

fn new_account_row(account: &CreditAccount) -> NewCreditAccount {
    NewCreditAccount {
        id: account.id.into(),
        customer_id: account.customer_id.into(),
        currency: account.currency.code().to_string(),
        credit_limit: account.credit_limit.amount(),
        current_balance: account.current_balance.amount(),
        status: account.status.as_str().to_string(),
        payment_terms_days: account.payment_terms.days() as i32,
        interest_rate: account.interest_rate.map(|r| r.as_percentage()),
        notes: account.notes.clone(),
        last_payment_at: account.last_payment_at,
        created_at: account.created_at,
        updated_at: account.updated_at,
        version: account.version,
    }
}

/// Converts a database account row to the domain account
pub(crate) fn account_from_row(row: CreditAccountRow) -> Result<CreditAccount, PortError> {
    let currency: Currency = row
        .currency
        .parse()
        .map_err(|e| decode_error("currency", e))?;
    let status: AccountStatus = row.status.parse().map_err(|e| decode_error("status", e))?;
    let payment_terms = u32::try_from(row.payment_terms_days)
        .map_err(|e| decode_error("payment_terms_days", e))
        .and_then(|days| {
            PaymentTerms::try_from(days).map_err(|e| decode_error("payment_terms_days", e))
        })?;

    Ok(CreditAccount {
        id: CreditAccountId::from(row.id),
        customer_id: row.customer_id.into(),
        customer_name: Some(row.customer_name),
        currency,
        credit_limit: Money::new(row.credit_limit, currency),
        current_balance: Money::new(row.current_balance, currency),
        status,
        payment_terms,
        interest_rate: row.interest_rate.map(Rate::from_percentage),
        notes: row.notes,
        last_payment_at: row.last_payment_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
        version: row.version,
    })
}

/// Converts a database transaction row to the domain transaction
pub(crate) fn transaction_from_row(row: CreditTransactionRow) -> Result<CreditTransaction, PortError> {
    let currency: Currency = row
        .currency
        .parse()
        .map_err(|e| decode_error("currency", e))?;
    let kind: TransactionKind = row
        .transaction_type
        .parse()
        .map_err(|e| decode_error("transaction_type", e))?;

    Ok(CreditTransaction {
        id: row.id.into(),
        account_id: row.account_id.into(),
        kind,
        amount: Money::new(row.amount, currency),
        description: row.description,
        reference: row.reference,
        payment_method: row.payment_method,
        created_at: row.created_at,
        created_by: row.created_by,
    })
}
