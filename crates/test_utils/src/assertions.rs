//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than a bare `assert_eq!` on nested structs.

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_cash::{DailyOperation, OperationStatus};
use domain_credit::{reconcile, CreditAccount, CreditTransaction, Reconciliation, Statement};

/// Asserts that a Money value has the given amount and currency
pub fn assert_money_eq(actual: &Money, amount: Decimal, currency: Currency) {
    assert_eq!(
        actual.currency(),
        currency,
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        currency
    );
    assert_eq!(
        actual.amount(),
        amount,
        "Amount mismatch: actual={}, expected={}",
        actual.amount(),
        amount
    );
}

/// Asserts the balance and derived available credit of an account
pub fn assert_balance(account: &CreditAccount, balance: Decimal) {
    assert_money_eq(&account.current_balance, balance, account.currency);
    assert_eq!(
        account.available_credit().amount(),
        account.credit_limit.amount() - balance,
        "available credit must equal limit minus balance"
    );
}

/// Asserts that the stored balance equals the sum of the ledger
pub fn assert_ledger_reconciles(account: &CreditAccount, transactions: &[CreditTransaction]) {
    match reconcile(account, transactions) {
        Ok(Reconciliation::Balanced) => {}
        Ok(Reconciliation::Mismatch { stored, ledger }) => panic!(
            "Account {} is out of balance: stored={}, ledger={}",
            account.id, stored, ledger
        ),
        Err(e) => panic!("Account {} could not be reconciled: {}", account.id, e),
    }
}

/// Asserts that no running balance in a statement dips below zero
pub fn assert_never_negative(statement: &Statement) {
    for line in statement.running_balances() {
        assert!(
            !line.running_balance.is_negative(),
            "Balance went negative after {} ({}): {}",
            line.transaction.id,
            line.transaction.description,
            line.running_balance.amount()
        );
    }
}

/// Asserts that an operation is closed with the given peso count
pub fn assert_closed_with(operation: &DailyOperation, closing_mxn: Decimal) {
    assert_eq!(
        operation.status,
        OperationStatus::Closed,
        "Operation for {} is still {}",
        operation.business_date,
        operation.status.as_str()
    );
    let closing = operation
        .closing
        .unwrap_or_else(|| panic!("Closed operation for {} has no count", operation.business_date));
    assert_money_eq(&closing.mxn, closing_mxn, Currency::MXN);
    assert!(operation.closed_at.is_some(), "closed operation must carry closed_at");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{CreditAccountBuilder, CreditTransactionBuilder, DailyOperationBuilder};
    use crate::fixtures::MoneyFixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reconciled_ledger_passes() {
        let account = CreditAccountBuilder::new().with_balance(dec!(700)).build();
        let ledger = vec![
            CreditTransactionBuilder::charge(account.id, dec!(1000)).build(),
            CreditTransactionBuilder::payment(account.id, dec!(300)).build(),
        ];
        assert_ledger_reconciles(&account, &ledger);
        assert_balance(&account, dec!(700));
    }

    #[test]
    #[should_panic(expected = "out of balance")]
    fn test_mismatched_ledger_fails() {
        let account = CreditAccountBuilder::new().with_balance(dec!(700)).build();
        let ledger = vec![CreditTransactionBuilder::charge(account.id, dec!(1000)).build()];
        assert_ledger_reconciles(&account, &ledger);
    }

    #[test]
    #[should_panic(expected = "still open")]
    fn test_open_operation_is_not_closed() {
        let op = DailyOperationBuilder::new().build();
        assert_closed_with(&op, dec!(0));
    }

    #[test]
    fn test_closed_operation() {
        let op = DailyOperationBuilder::new()
            .closed_with(MoneyFixtures::closing_count())
            .build();
        assert_closed_with(&op, dec!(4230));
    }
}
