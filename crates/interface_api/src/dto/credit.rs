//! Credit DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_credit::{
    AccountStatus, AgingReport, CreditAccount, CreditTransaction, LedgerOutcome, LedgerWarning,
    PortfolioSummary,
};

fn default_terms() -> u32 {
    30
}

#[derive(Debug, Deserialize, Validate)]
pub struct OpenAccountBody {
    pub customer_id: Uuid,
    pub credit_limit: Decimal,
    #[serde(default = "default_terms")]
    pub payment_terms_days: u32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    /// Percentage, e.g. 2.5
    pub interest_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChargeBody {
    pub amount: Decimal,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentBody {
    pub amount: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdjustmentBody {
    /// Signed: positive raises the balance, negative lowers it
    pub amount: Decimal,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: AccountStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountListParams {
    pub status: Option<AccountStatus>,
    pub customer_id: Option<Uuid>,
    /// Case-insensitive fragment of the customer's name
    pub customer_name: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    pub currency: String,
    pub credit_limit: Decimal,
    pub current_balance: Decimal,
    pub available_credit: Decimal,
    pub utilization: Decimal,
    pub status: AccountStatus,
    pub payment_terms_days: u32,
    pub interest_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl From<&CreditAccount> for AccountResponse {
    fn from(account: &CreditAccount) -> Self {
        Self {
            id: account.id.into(),
            customer_id: account.customer_id.into(),
            customer_name: account.customer_name.clone(),
            currency: account.currency.code().to_string(),
            credit_limit: account.credit_limit.amount(),
            current_balance: account.current_balance.amount(),
            available_credit: account.available_credit().amount(),
            utilization: account.utilization().round_dp(4),
            status: account.status,
            payment_terms_days: account.payment_terms.days(),
            interest_rate: account.interest_rate.map(|r| r.as_percentage()),
            notes: account.notes.clone(),
            last_payment_at: account.last_payment_at,
            created_at: account.created_at,
            updated_at: account.updated_at,
            version: account.version,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_type: String,
    pub amount: Decimal,
    pub description: String,
    pub reference: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    /// Balance after this entry; present in statements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_balance: Option<Decimal>,
}

impl From<&CreditTransaction> for TransactionResponse {
    fn from(tx: &CreditTransaction) -> Self {
        Self {
            id: tx.id.into(),
            account_id: tx.account_id.into(),
            transaction_type: tx.kind.as_str().to_string(),
            amount: tx.amount.amount(),
            description: tx.description.clone(),
            reference: tx.reference.clone(),
            payment_method: tx.payment_method.clone(),
            created_at: tx.created_at,
            created_by: tx.created_by.clone(),
            running_balance: None,
        }
    }
}

/// Result of a charge, payment, or adjustment
#[derive(Debug, Serialize)]
pub struct PostingResponse {
    pub account: AccountResponse,
    pub transaction: TransactionResponse,
    pub warnings: Vec<LedgerWarning>,
}

impl From<LedgerOutcome> for PostingResponse {
    fn from(outcome: LedgerOutcome) -> Self {
        Self {
            account: AccountResponse::from(&outcome.account),
            transaction: TransactionResponse::from(&outcome.transaction),
            warnings: outcome.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatementResponse {
    pub account_id: Uuid,
    pub currency: String,
    pub closing_balance: Decimal,
    pub transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Serialize)]
pub struct AgingResponse {
    pub as_of: NaiveDate,
    pub currency: String,
    pub current: Decimal,
    pub days_31_60: Decimal,
    pub days_61_90: Decimal,
    pub over_90: Decimal,
    pub total: Decimal,
}

impl AgingResponse {
    pub fn new(report: &AgingReport, total: Decimal) -> Self {
        Self {
            as_of: report.as_of,
            currency: report.current.currency().code().to_string(),
            current: report.current.amount(),
            days_31_60: report.days_31_60.amount(),
            days_61_90: report.days_61_90.amount(),
            over_90: report.over_90.amount(),
            total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub account_count: usize,
    pub active_count: usize,
    pub suspended_count: usize,
    pub currency: String,
    pub total_credit_limit: Decimal,
    pub total_outstanding: Decimal,
    pub total_available: Decimal,
    pub utilization: Decimal,
    pub over_limit_count: usize,
    pub near_limit_count: usize,
}

impl From<&PortfolioSummary> for PortfolioResponse {
    fn from(summary: &PortfolioSummary) -> Self {
        Self {
            account_count: summary.account_count,
            active_count: summary.active_count,
            suspended_count: summary.suspended_count,
            currency: summary.total_credit_limit.currency().code().to_string(),
            total_credit_limit: summary.total_credit_limit.amount(),
            total_outstanding: summary.total_outstanding.amount(),
            total_available: summary.total_available.amount(),
            utilization: summary.utilization,
            over_limit_count: summary.over_limit_count,
            near_limit_count: summary.near_limit_count,
        }
    }
}
