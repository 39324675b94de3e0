//! Credit Domain Ports
//!
//! The credit service reaches storage, the customer directory, and the
//! messaging channel only through the traits in this module.
//!
//! - **Postgres adapters** live in `infra_db`
//! - **In-memory mocks** live in [`mock`] (feature `mock`)
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_credit::ports::CreditLedgerPort;
//! use std::sync::Arc;
//!
//! let ledger: Arc<dyn CreditLedgerPort> = Arc::new(PostgresCreditLedgerAdapter::new(pool));
//! let account = ledger.get_account(id).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{
    CreditAccountId, CustomerId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};

use crate::account::{AccountStatus, CreditAccount};
use crate::ledger::Posting;
use crate::notification::{CustomerContact, OutboundMessage};
use crate::transaction::CreditTransaction;

/// Query parameters for finding accounts
#[derive(Debug, Clone, Default)]
pub struct AccountQuery {
    /// Filter by owning customer
    pub customer_id: Option<CustomerId>,
    /// Case-insensitive fragment of the customer's name
    pub customer_name: Option<String>,
    /// Filter by status
    pub status: Option<AccountStatus>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl AccountQuery {
    /// Creates a query to find by customer
    pub fn by_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Creates a query to find by a fragment of the customer's name
    pub fn by_customer_name(name: impl Into<String>) -> Self {
        Self {
            customer_name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Creates a query to find by status
    pub fn by_status(status: AccountStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Returns true if the account satisfies every filter
    pub fn matches(&self, account: &CreditAccount) -> bool {
        self.customer_id.map_or(true, |c| account.customer_id == c)
            && self.status.map_or(true, |s| account.status == s)
            && self.customer_name.as_deref().map_or(true, |fragment| {
                account
                    .customer_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&fragment.to_lowercase()))
            })
    }
}

/// Storage for accounts and their transaction trail
///
/// Implementations must serialize writes to the same account with the
/// version counter: a write whose expected version no longer matches the
/// stored one fails with `PortError::Conflict` and changes nothing.
#[async_trait]
pub trait CreditLedgerPort: DomainPort + HealthCheckable {
    /// Stores a newly opened account
    async fn insert_account(&self, account: &CreditAccount) -> Result<(), PortError>;

    /// Retrieves an account by ID
    ///
    /// # Returns
    ///
    /// The account if found, or `PortError::NotFound`
    async fn get_account(&self, id: CreditAccountId) -> Result<CreditAccount, PortError>;

    /// Finds accounts matching the query, newest first
    async fn find_accounts(&self, query: AccountQuery) -> Result<Vec<CreditAccount>, PortError>;

    /// Persists a status change
    ///
    /// # Arguments
    ///
    /// * `account` - The account with its new status and bumped version
    /// * `expected_version` - Version the stored row must still have
    async fn update_status(
        &self,
        account: &CreditAccount,
        expected_version: i64,
    ) -> Result<(), PortError>;

    /// Atomically writes the new balance and appends the transaction
    ///
    /// Either both the account update and the transaction insert are
    /// committed, or neither is.
    async fn record_posting(&self, posting: &Posting) -> Result<(), PortError>;

    /// Lists an account's transactions ordered by `created_at` ascending
    ///
    /// Returns an empty list for unknown accounts.
    async fn list_transactions(
        &self,
        account_id: CreditAccountId,
    ) -> Result<Vec<CreditTransaction>, PortError>;
}

/// Read access to customer contact data
#[async_trait]
pub trait CustomerDirectoryPort: DomainPort {
    /// Returns the customer's contact, or `None` if the customer is unknown
    async fn get_contact(&self, customer_id: CustomerId) -> Result<Option<CustomerContact>, PortError>;
}

/// Outbound customer messaging
#[async_trait]
pub trait NotificationPort: DomainPort {
    /// Delivers a rendered message; failures are reported, never retried
    async fn send(&self, message: &OutboundMessage) -> Result<(), PortError>;
}

/// In-memory implementations for tests and local runs
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;

    use core_kernel::AdapterHealth;

    #[derive(Debug, Default)]
    struct LedgerState {
        accounts: HashMap<CreditAccountId, CreditAccount>,
        transactions: HashMap<CreditAccountId, Vec<CreditTransaction>>,
    }

    /// In-memory mock implementation of CreditLedgerPort
    ///
    /// Accounts and transactions share one lock so a posting is applied as a
    /// unit, the same way the Postgres adapter uses a database transaction.
    #[derive(Debug, Default)]
    pub struct MockCreditLedgerPort {
        state: Arc<RwLock<LedgerState>>,
        unavailable: AtomicBool,
    }

    impl MockCreditLedgerPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent call fail with `ServiceUnavailable`
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Overwrites the stored version of an account, simulating a
        /// concurrent writer
        pub async fn bump_version(&self, id: CreditAccountId) {
            if let Some(account) = self.state.write().await.accounts.get_mut(&id) {
                account.version += 1;
            }
        }

        /// Inserts a transaction without touching the balance
        pub async fn insert_raw_transaction(&self, transaction: CreditTransaction) {
            self.state
                .write()
                .await
                .transactions
                .entry(transaction.account_id)
                .or_default()
                .push(transaction);
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "mock-credit-ledger".to_string(),
                });
            }
            Ok(())
        }
    }

    impl DomainPort for MockCreditLedgerPort {}

    #[async_trait]
    impl HealthCheckable for MockCreditLedgerPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-credit-ledger".to_string(),
                status: if self.unavailable.load(Ordering::SeqCst) {
                    AdapterHealth::Unhealthy
                } else {
                    AdapterHealth::Healthy
                },
                latency_ms: 0,
                message: Some("Mock adapter".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl CreditLedgerPort for MockCreditLedgerPort {
        async fn insert_account(&self, account: &CreditAccount) -> Result<(), PortError> {
            self.check_available()?;
            let mut state = self.state.write().await;
            if state.accounts.contains_key(&account.id) {
                return Err(PortError::conflict(format!("account {} already exists", account.id)));
            }
            state.accounts.insert(account.id, account.clone());
            Ok(())
        }

        async fn get_account(&self, id: CreditAccountId) -> Result<CreditAccount, PortError> {
            self.check_available()?;
            self.state
                .read()
                .await
                .accounts
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("CreditAccount", id))
        }

        async fn find_accounts(&self, query: AccountQuery) -> Result<Vec<CreditAccount>, PortError> {
            self.check_available()?;
            let state = self.state.read().await;
            let mut results: Vec<_> = state
                .accounts
                .values()
                .filter(|a| query.matches(a))
                .cloned()
                .collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

            let offset = query.offset.unwrap_or(0) as usize;
            let limit = query.limit.map_or(usize::MAX, |l| l as usize);
            Ok(results.into_iter().skip(offset).take(limit).collect())
        }

        async fn update_status(
            &self,
            account: &CreditAccount,
            expected_version: i64,
        ) -> Result<(), PortError> {
            self.check_available()?;
            let mut state = self.state.write().await;
            let stored = state
                .accounts
                .get_mut(&account.id)
                .ok_or_else(|| PortError::not_found("CreditAccount", account.id))?;
            if stored.version != expected_version {
                return Err(PortError::conflict(format!(
                    "account {} is at version {}, expected {}",
                    account.id, stored.version, expected_version
                )));
            }
            stored.status = account.status;
            stored.updated_at = account.updated_at;
            stored.version = account.version;
            Ok(())
        }

        async fn record_posting(&self, posting: &Posting) -> Result<(), PortError> {
            self.check_available()?;
            let mut state = self.state.write().await;
            let account = &posting.account;
            let stored = state
                .accounts
                .get_mut(&account.id)
                .ok_or_else(|| PortError::not_found("CreditAccount", account.id))?;
            if stored.version != posting.expected_version {
                return Err(PortError::conflict(format!(
                    "account {} is at version {}, expected {}",
                    account.id, stored.version, posting.expected_version
                )));
            }
            *stored = account.clone();
            state
                .transactions
                .entry(account.id)
                .or_default()
                .push(posting.transaction.clone());
            Ok(())
        }

        async fn list_transactions(
            &self,
            account_id: CreditAccountId,
        ) -> Result<Vec<CreditTransaction>, PortError> {
            self.check_available()?;
            let mut transactions = self
                .state
                .read()
                .await
                .transactions
                .get(&account_id)
                .cloned()
                .unwrap_or_default();
            transactions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(transactions)
        }
    }

    /// In-memory customer directory
    #[derive(Debug, Default)]
    pub struct MockCustomerDirectory {
        contacts: RwLock<HashMap<CustomerId, CustomerContact>>,
    }

    impl MockCustomerDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a customer
        pub async fn add(&self, contact: CustomerContact) {
            self.contacts.write().await.insert(contact.customer_id, contact);
        }
    }

    impl DomainPort for MockCustomerDirectory {}

    #[async_trait]
    impl CustomerDirectoryPort for MockCustomerDirectory {
        async fn get_contact(&self, customer_id: CustomerId) -> Result<Option<CustomerContact>, PortError> {
            Ok(self.contacts.read().await.get(&customer_id).cloned())
        }
    }

    /// Records sent messages; can be told to fail or stall
    #[derive(Debug, Default)]
    pub struct MockNotificationPort {
        sent: RwLock<Vec<OutboundMessage>>,
        failing: AtomicBool,
        delay: RwLock<Option<Duration>>,
    }

    impl MockNotificationPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every send fail
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Makes every send wait before completing
        pub async fn set_delay(&self, delay: Option<Duration>) {
            *self.delay.write().await = delay;
        }

        /// Messages delivered so far
        pub async fn sent(&self) -> Vec<OutboundMessage> {
            self.sent.read().await.clone()
        }
    }

    impl DomainPort for MockNotificationPort {}

    #[async_trait]
    impl NotificationPort for MockNotificationPort {
        async fn send(&self, message: &OutboundMessage) -> Result<(), PortError> {
            let delay = *self.delay.read().await;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::connection("messaging gateway unreachable"));
            }
            self.sent.write().await.push(message.clone());
            Ok(())
        }
    }
}
