//! Credit ledger application service
//!
//! Orchestrates one request at a time: load the account, run the pure
//! posting rules, persist with a version check, then notify the customer.
//! The service holds no balance state of its own; storage is authoritative.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use core_kernel::{BusinessCalendar, Clock, CreditAccountId, PortError};

use crate::account::{AccountStatus, CreditAccount, OpenAccountRequest};
use crate::error::CreditError;
use crate::ledger::{
    AdjustmentRequest, ChargeRequest, LedgerWarning, PaymentRequest, PostingRequest, PostingRules,
};
use crate::notification::{CreditNotice, OutboundMessage};
use crate::policy::CreditPolicy;
use crate::portfolio::PortfolioSummary;
use crate::ports::{AccountQuery, CreditLedgerPort, CustomerDirectoryPort, NotificationPort};
use crate::statement::{AgingReport, Statement};
use crate::transaction::CreditTransaction;

/// Result of a committed posting
#[derive(Debug, Clone)]
pub struct LedgerOutcome {
    pub account: CreditAccount,
    pub transaction: CreditTransaction,
    pub warnings: Vec<LedgerWarning>,
}

/// Entry point for every credit operation
pub struct CreditLedgerService {
    ledger: Arc<dyn CreditLedgerPort>,
    directory: Arc<dyn CustomerDirectoryPort>,
    notifier: Arc<dyn NotificationPort>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
    rules: PostingRules,
}

impl CreditLedgerService {
    pub fn new(
        ledger: Arc<dyn CreditLedgerPort>,
        directory: Arc<dyn CustomerDirectoryPort>,
        notifier: Arc<dyn NotificationPort>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
        policy: CreditPolicy,
    ) -> Self {
        Self {
            ledger,
            directory,
            notifier,
            clock,
            calendar,
            rules: PostingRules::new(policy),
        }
    }

    pub fn policy(&self) -> &CreditPolicy {
        self.rules.policy()
    }

    /// Opens a new credit line for an existing customer
    ///
    /// # Errors
    ///
    /// `CreditError::Validation` for a bad limit, terms, rate, or unknown
    /// customer; `CreditError::Dependency` if storage fails.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn open_account(
        &self,
        request: OpenAccountRequest,
        operator: &str,
    ) -> Result<CreditAccount, CreditError> {
        let mut account = CreditAccount::open(request, self.policy().currency, self.clock.now())?;

        let contact = self
            .directory
            .get_contact(account.customer_id)
            .await
            .map_err(CreditError::Dependency)?
            .ok_or_else(|| {
                CreditError::validation(format!("customer {} does not exist", account.customer_id))
            })?;
        account.customer_name = Some(contact.name);

        self.ledger.insert_account(&account).await?;
        info!(
            account_id = %account.id,
            credit_limit = %account.credit_limit.amount(),
            terms = account.payment_terms.days(),
            operator,
            "credit account opened"
        );
        Ok(account)
    }

    /// Retrieves an account by ID
    pub async fn get_account(&self, id: CreditAccountId) -> Result<CreditAccount, CreditError> {
        Ok(self.ledger.get_account(id).await?)
    }

    /// Lists accounts matching the query; empty when nothing matches
    pub async fn list_accounts(&self, query: AccountQuery) -> Result<Vec<CreditAccount>, CreditError> {
        Ok(self.ledger.find_accounts(query).await?)
    }

    /// Posts a purchase on credit
    pub async fn apply_charge(
        &self,
        id: CreditAccountId,
        request: ChargeRequest,
        operator: &str,
    ) -> Result<LedgerOutcome, CreditError> {
        self.post(id, PostingRequest::Charge(request), operator).await
    }

    /// Posts a customer payment
    pub async fn apply_payment(
        &self,
        id: CreditAccountId,
        request: PaymentRequest,
        operator: &str,
    ) -> Result<LedgerOutcome, CreditError> {
        self.post(id, PostingRequest::Payment(request), operator).await
    }

    /// Posts a signed manual adjustment
    pub async fn apply_adjustment(
        &self,
        id: CreditAccountId,
        request: AdjustmentRequest,
        operator: &str,
    ) -> Result<LedgerOutcome, CreditError> {
        self.post(id, PostingRequest::Adjustment(request), operator).await
    }

    #[instrument(skip(self, request), fields(kind = %request.kind()))]
    async fn post(
        &self,
        id: CreditAccountId,
        request: PostingRequest,
        operator: &str,
    ) -> Result<LedgerOutcome, CreditError> {
        let account = self.ledger.get_account(id).await?;
        let posting = self.rules.apply(&account, request, operator, self.clock.now())?;

        self.ledger.record_posting(&posting).await.map_err(|e| match e {
            PortError::Conflict { .. } => CreditError::ConcurrentModification(id.to_string()),
            other => CreditError::from(other),
        })?;

        info!(
            account_id = %id,
            transaction_id = %posting.transaction.id,
            kind = %posting.transaction.kind,
            amount = %posting.transaction.amount.amount(),
            balance = %posting.account.current_balance.amount(),
            "posting committed"
        );
        for warning in &posting.warnings {
            warn!(account_id = %id, %warning, "credit limit warning");
        }

        let mut warnings = posting.warnings;
        let near_limit = warnings
            .iter()
            .any(|w| matches!(w, LedgerWarning::NearLimit { .. } | LedgerWarning::OverLimit { .. }));
        if let Some(notice) = CreditNotice::for_posting(&posting.account, &posting.transaction, near_limit) {
            if let Some(warning) = self.notify(&posting.account, notice).await {
                warnings.push(warning);
            }
        }

        Ok(LedgerOutcome {
            account: posting.account,
            transaction: posting.transaction,
            warnings,
        })
    }

    /// Sends a notice; any failure becomes a warning on the outcome
    async fn notify(&self, account: &CreditAccount, notice: CreditNotice) -> Option<LedgerWarning> {
        let contact = match self.directory.get_contact(account.customer_id).await {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                debug!(customer_id = %account.customer_id, "customer not in directory, notice skipped");
                return None;
            }
            Err(e) => return Some(self.notification_failed(account, e.to_string())),
        };
        let Some(phone) = contact.phone.clone().filter(|p| !p.trim().is_empty()) else {
            debug!(customer_id = %account.customer_id, "customer has no phone, notice skipped");
            return None;
        };

        let message = OutboundMessage {
            recipient: phone,
            customer_id: contact.customer_id,
            customer_name: contact.name.clone(),
            text: notice.render(&contact.name),
            sent_at: self.clock.now(),
        };

        let timeout = self.policy().notification_timeout;
        match tokio::time::timeout(timeout, self.notifier.send(&message)).await {
            Ok(Ok(())) => {
                debug!(account_id = %account.id, "customer notified");
                None
            }
            Ok(Err(e)) => Some(self.notification_failed(account, e.to_string())),
            Err(_) => Some(self.notification_failed(
                account,
                format!("timed out after {}ms", timeout.as_millis()),
            )),
        }
    }

    fn notification_failed(&self, account: &CreditAccount, reason: String) -> LedgerWarning {
        warn!(account_id = %account.id, %reason, "customer notification failed");
        LedgerWarning::NotificationFailed { reason }
    }

    /// Suspends, reactivates, or closes an account
    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        id: CreditAccountId,
        target: AccountStatus,
        operator: &str,
    ) -> Result<CreditAccount, CreditError> {
        let mut account = self.ledger.get_account(id).await?;
        let expected_version = account.version;
        let previous = account.status;

        account.transition_to(target, self.clock.now())?;
        account.version = expected_version + 1;

        self.ledger
            .update_status(&account, expected_version)
            .await
            .map_err(|e| match e {
                PortError::Conflict { .. } => CreditError::ConcurrentModification(id.to_string()),
                other => CreditError::from(other),
            })?;

        info!(account_id = %id, from = %previous, to = %target, operator, "account status changed");
        Ok(account)
    }

    /// Transaction history ordered oldest first; empty for unknown accounts
    pub async fn statement(&self, id: CreditAccountId) -> Result<Statement, CreditError> {
        let transactions = self.ledger.list_transactions(id).await?;
        Ok(Statement::new(id, self.policy().currency, transactions))
    }

    /// Outstanding balance of one account by age bucket
    pub async fn account_aging(&self, id: CreditAccountId) -> Result<AgingReport, CreditError> {
        let account = self.ledger.get_account(id).await?;
        let statement = Statement::new(
            account.id,
            account.currency,
            self.ledger.list_transactions(id).await?,
        );
        Ok(AgingReport::from_statement(&statement, &self.calendar, self.clock.now())?)
    }

    /// Store-wide totals over all accounts
    pub async fn portfolio_summary(&self) -> Result<PortfolioSummary, CreditError> {
        let accounts = self.ledger.find_accounts(AccountQuery::default()).await?;
        let policy = self.policy();
        Ok(PortfolioSummary::from_accounts(
            &accounts,
            policy.currency,
            policy.near_limit_threshold,
        )?)
    }

    /// Store-wide receivable aging
    pub async fn portfolio_aging(&self) -> Result<AgingReport, CreditError> {
        let now = self.clock.now();
        let accounts = self.ledger.find_accounts(AccountQuery::default()).await?;
        let mut total = AgingReport::empty(self.calendar.business_date(now), self.policy().currency);

        for account in accounts.iter().filter(|a| !a.current_balance.is_zero()) {
            let statement = Statement::new(
                account.id,
                account.currency,
                self.ledger.list_transactions(account.id).await?,
            );
            let report = AgingReport::from_statement(&statement, &self.calendar, now)?;
            total.merge(&report)?;
        }
        Ok(total)
    }
}
