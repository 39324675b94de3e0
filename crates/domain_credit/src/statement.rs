//! Account statements and receivable aging
//!
//! Both views are computed from the transaction trail, never stored. A
//! statement can be walked any number of times; aging applies every credit
//! (payments and negative adjustments) to the oldest outstanding debits
//! first, so the four buckets always add up to the current balance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use core_kernel::{BusinessCalendar, CreditAccountId, Currency, Money, MoneyError};

use crate::transaction::CreditTransaction;

/// Ordered transaction history of one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub account_id: CreditAccountId,
    pub currency: Currency,
    transactions: Vec<CreditTransaction>,
}

/// A statement line with the balance after it
#[derive(Debug, Clone, Serialize)]
pub struct StatementLine<'a> {
    pub transaction: &'a CreditTransaction,
    pub running_balance: Money,
}

impl Statement {
    /// Builds a statement; transactions are sorted by creation time
    pub fn new(
        account_id: CreditAccountId,
        currency: Currency,
        mut transactions: Vec<CreditTransaction>,
    ) -> Self {
        transactions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Self {
            account_id,
            currency,
            transactions,
        }
    }

    /// Iterates transactions oldest first; each call starts over
    pub fn iter(&self) -> impl Iterator<Item = &CreditTransaction> + '_ {
        self.transactions.iter()
    }

    /// Iterates transactions paired with the balance after each one
    ///
    /// Balances clamp at the decimal range; `closing_balance` reports overflow.
    pub fn running_balances(&self) -> impl Iterator<Item = StatementLine<'_>> + '_ {
        let currency = self.currency;
        self.transactions.iter().scan(Money::zero(currency), move |balance, tx| {
            *balance = Money::new(balance.amount().saturating_add(tx.amount.amount()), currency);
            Some(StatementLine {
                transaction: tx,
                running_balance: *balance,
            })
        })
    }

    /// Sum of all amounts; equals the account balance when reconciled
    pub fn closing_balance(&self) -> Result<Money, MoneyError> {
        Money::sum(self.transactions.iter().map(|t| &t.amount), self.currency)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn into_transactions(self) -> Vec<CreditTransaction> {
        self.transactions
    }
}

/// Age bracket of an outstanding debit, in days since it was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// 0 to 30 days
    Current,
    /// 31 to 60 days
    Days31To60,
    /// 61 to 90 days
    Days61To90,
    /// More than 90 days
    Over90,
}

impl AgingBucket {
    pub fn for_age(days: i64) -> Self {
        match days {
            i64::MIN..=30 => AgingBucket::Current,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }
}

/// Outstanding balance split by age
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    pub as_of: NaiveDate,
    pub current: Money,
    pub days_31_60: Money,
    pub days_61_90: Money,
    pub over_90: Money,
}

impl AgingReport {
    /// An empty report
    pub fn empty(as_of: NaiveDate, currency: Currency) -> Self {
        Self {
            as_of,
            current: Money::zero(currency),
            days_31_60: Money::zero(currency),
            days_61_90: Money::zero(currency),
            over_90: Money::zero(currency),
        }
    }

    /// Ages a statement as of `now` in the store's calendar
    pub fn from_statement(
        statement: &Statement,
        calendar: &BusinessCalendar,
        now: DateTime<Utc>,
    ) -> Result<Self, MoneyError> {
        let currency = statement.currency;
        let mut report = Self::empty(calendar.business_date(now), currency);

        let mut open_debits: VecDeque<(DateTime<Utc>, Money)> = VecDeque::new();
        let mut unapplied = Money::zero(currency);

        for tx in statement.iter() {
            if tx.amount.is_positive() {
                open_debits.push_back((tx.created_at, tx.amount));
            } else {
                unapplied = unapplied.checked_add(&tx.amount.abs())?;
            }
            while unapplied.is_positive() {
                let Some((created_at, remaining)) = open_debits.pop_front() else {
                    break;
                };
                if remaining.amount() > unapplied.amount() {
                    open_debits.push_front((created_at, remaining.checked_sub(&unapplied)?));
                    unapplied = Money::zero(currency);
                } else {
                    unapplied = unapplied.checked_sub(&remaining)?;
                }
            }
        }

        for (created_at, remaining) in open_debits {
            let age = calendar.days_between(created_at, now);
            report.add(AgingBucket::for_age(age), &remaining)?;
        }
        Ok(report)
    }

    /// Adds an amount to one bucket
    pub fn add(&mut self, bucket: AgingBucket, amount: &Money) -> Result<(), MoneyError> {
        let slot = match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Over90 => &mut self.over_90,
        };
        *slot = slot.checked_add(amount)?;
        Ok(())
    }

    /// Folds another report into this one
    pub fn merge(&mut self, other: &AgingReport) -> Result<(), MoneyError> {
        self.add(AgingBucket::Current, &other.current)?;
        self.add(AgingBucket::Days31To60, &other.days_31_60)?;
        self.add(AgingBucket::Days61To90, &other.days_61_90)?;
        self.add(AgingBucket::Over90, &other.over_90)?;
        Ok(())
    }

    pub fn get(&self, bucket: AgingBucket) -> Money {
        match bucket {
            AgingBucket::Current => self.current,
            AgingBucket::Days31To60 => self.days_31_60,
            AgingBucket::Days61To90 => self.days_61_90,
            AgingBucket::Over90 => self.over_90,
        }
    }

    /// Sum of all buckets
    pub fn total(&self) -> Result<Money, MoneyError> {
        Money::sum(
            [&self.current, &self.days_31_60, &self.days_61_90, &self.over_90],
            self.current.currency(),
        )
    }
}
