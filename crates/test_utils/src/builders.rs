//! Test Data Builders
//!
//! Builders for domain records with sensible defaults. Tests set only the
//! fields they care about. Records are assembled directly, bypassing the
//! domain constructors, so tests can also stage states those constructors
//! would refuse (an account over its limit, a stale version).

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use core_kernel::{
    BranchId, CreditAccountId, CreditTransactionId, Currency, CustomerId, DailyOperationId, Money,
    Rate,
};
use domain_cash::{CashCount, DailyOperation, OperationStatus};
use domain_credit::{AccountStatus, CreditAccount, CreditTransaction, PaymentTerms, TransactionKind};

use crate::fixtures::{IdFixtures, MoneyFixtures, TemporalFixtures};

/// Builder for credit accounts
pub struct CreditAccountBuilder {
    id: CreditAccountId,
    customer_id: CustomerId,
    customer_name: Option<String>,
    credit_limit: Decimal,
    balance: Decimal,
    status: AccountStatus,
    payment_terms: PaymentTerms,
    interest_rate: Option<Rate>,
    last_payment_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    version: i64,
}

impl Default for CreditAccountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditAccountBuilder {
    pub fn new() -> Self {
        Self {
            id: CreditAccountId::new_v7(),
            customer_id: IdFixtures::customer_id(),
            customer_name: None,
            credit_limit: MoneyFixtures::mxn_limit().amount(),
            balance: Decimal::ZERO,
            status: AccountStatus::Active,
            payment_terms: PaymentTerms::Days30,
            interest_rate: None,
            last_payment_at: None,
            created_at: TemporalFixtures::store_open(),
            version: 1,
        }
    }

    pub fn with_id(mut self, id: CreditAccountId) -> Self {
        self.id = id;
        self
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn with_limit(mut self, limit: Decimal) -> Self {
        self.credit_limit = limit;
        self
    }

    /// Sets the balance without a matching ledger
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_terms(mut self, terms: PaymentTerms) -> Self {
        self.payment_terms = terms;
        self
    }

    /// Interest rate as a percentage
    pub fn with_interest_percentage(mut self, percentage: Decimal) -> Self {
        self.interest_rate = Some(Rate::from_percentage(percentage));
        self
    }

    pub fn with_last_payment_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_payment_at = Some(at);
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn build(self) -> CreditAccount {
        CreditAccount {
            id: self.id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            currency: Currency::MXN,
            credit_limit: Money::mxn(self.credit_limit),
            current_balance: Money::mxn(self.balance),
            status: self.status,
            payment_terms: self.payment_terms,
            interest_rate: self.interest_rate,
            notes: None,
            last_payment_at: self.last_payment_at,
            created_at: self.created_at,
            updated_at: self.created_at,
            version: self.version,
        }
    }
}

/// Builder for ledger entries
///
/// Amounts are given unsigned for charges and payments; the builder applies
/// the ledger sign. Adjustments keep the sign they are given.
pub struct CreditTransactionBuilder {
    account_id: CreditAccountId,
    kind: TransactionKind,
    amount: Decimal,
    description: String,
    reference: Option<String>,
    payment_method: Option<String>,
    created_at: DateTime<Utc>,
    created_by: String,
}

impl CreditTransactionBuilder {
    pub fn charge(account_id: CreditAccountId, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Charge, amount.abs(), "Compra a crédito")
    }

    pub fn payment(account_id: CreditAccountId, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Payment, -amount.abs(), "Pago de crédito")
            .with_payment_method("efectivo")
    }

    pub fn adjustment(account_id: CreditAccountId, signed_amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Adjustment, signed_amount, "Ajuste manual")
    }

    fn new(account_id: CreditAccountId, kind: TransactionKind, amount: Decimal, description: &str) -> Self {
        Self {
            account_id,
            kind,
            amount,
            description: description.to_string(),
            reference: None,
            payment_method: None,
            created_at: TemporalFixtures::store_open(),
            created_by: "Admin".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Places the entry `days` before the fixture instant
    pub fn days_ago(self, days: i64) -> Self {
        self.at(TemporalFixtures::store_open() - Duration::days(days))
    }

    pub fn by(mut self, operator: impl Into<String>) -> Self {
        self.created_by = operator.into();
        self
    }

    pub fn build(self) -> CreditTransaction {
        CreditTransaction {
            id: CreditTransactionId::new_v7(),
            account_id: self.account_id,
            kind: self.kind,
            amount: Money::mxn(self.amount),
            description: self.description,
            reference: self.reference,
            payment_method: self.payment_method,
            created_at: self.created_at,
            created_by: self.created_by,
        }
    }
}

/// Builder for daily cash operations
pub struct DailyOperationBuilder {
    branch_id: Option<BranchId>,
    business_date: NaiveDate,
    opening: CashCount,
    closing: Option<CashCount>,
    opened_by: String,
    opened_at: DateTime<Utc>,
}

impl Default for DailyOperationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DailyOperationBuilder {
    pub fn new() -> Self {
        Self {
            branch_id: None,
            business_date: TemporalFixtures::business_date(),
            opening: MoneyFixtures::opening_float(),
            closing: None,
            opened_by: "Admin".to_string(),
            opened_at: TemporalFixtures::store_open(),
        }
    }

    pub fn for_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn on(mut self, business_date: NaiveDate) -> Self {
        self.business_date = business_date;
        self
    }

    pub fn with_opening(mut self, opening: CashCount) -> Self {
        self.opening = opening;
        self
    }

    pub fn opened_by(mut self, operator: impl Into<String>) -> Self {
        self.opened_by = operator.into();
        self
    }

    /// Builds the operation already closed with `closing`
    pub fn closed_with(mut self, closing: CashCount) -> Self {
        self.closing = Some(closing);
        self
    }

    pub fn build(self) -> DailyOperation {
        let closed_at = self.closing.map(|_| self.opened_at + Duration::hours(10));
        DailyOperation {
            id: DailyOperationId::new_v7(),
            branch_id: self.branch_id,
            business_date: self.business_date,
            opening: self.opening,
            closing: self.closing,
            status: if self.closing.is_some() {
                OperationStatus::Closed
            } else {
                OperationStatus::Open
            },
            closed_by: self.closing.map(|_| self.opened_by.clone()),
            opened_by: self.opened_by,
            opened_at: self.opened_at,
            closed_at,
            created_at: self.opened_at,
            updated_at: closed_at.unwrap_or(self.opened_at),
        }
    }
}
