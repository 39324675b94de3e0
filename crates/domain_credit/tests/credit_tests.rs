//! Tests for domain_credit
//!
//! Exercises the service end to end over the in-memory ports.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BusinessCalendar, Clock, CreditAccountId, CustomerId, FixedClock, Money};

use domain_credit::ports::mock::{MockCreditLedgerPort, MockCustomerDirectory, MockNotificationPort};
use domain_credit::{
    reconcile, AccountQuery, AccountStatus, AdjustmentRequest, ChargeRequest, CreditError,
    CreditLedgerPort, CreditLedgerService, CreditPolicy, CustomerContact, LedgerWarning,
    OpenAccountRequest, PaymentRequest, PostingRequest, PostingRules, TransactionKind,
};

struct Fixture {
    service: CreditLedgerService,
    ledger: Arc<MockCreditLedgerPort>,
    notifier: Arc<MockNotificationPort>,
    clock: Arc<FixedClock>,
    customer_id: CustomerId,
}

async fn fixture_with(policy: CreditPolicy, phone: Option<&str>) -> Fixture {
    let ledger = Arc::new(MockCreditLedgerPort::new());
    let directory = Arc::new(MockCustomerDirectory::new());
    let notifier = Arc::new(MockNotificationPort::new());
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap()));
    let customer_id = CustomerId::new();
    directory
        .add(CustomerContact {
            customer_id,
            name: "Ferretería Hernández".into(),
            phone: phone.map(str::to_string),
        })
        .await;

    let service = CreditLedgerService::new(
        ledger.clone(),
        directory,
        notifier.clone(),
        clock.clone(),
        BusinessCalendar::default(),
        policy,
    );
    Fixture { service, ledger, notifier, clock, customer_id }
}

async fn fixture() -> Fixture {
    fixture_with(CreditPolicy::default(), Some("+525511112222")).await
}

fn open(customer_id: CustomerId, limit: Decimal) -> OpenAccountRequest {
    OpenAccountRequest {
        customer_id,
        credit_limit: Money::mxn(limit),
        payment_terms_days: 30,
        notes: Some("Cliente frecuente".into()),
        interest_rate: Some(dec!(2.5)),
    }
}

fn charge(amount: Decimal) -> ChargeRequest {
    ChargeRequest {
        amount: Money::mxn(amount),
        description: "Compra de materiales".into(),
        reference: Some("SALE-001".into()),
    }
}

fn payment(amount: Decimal) -> PaymentRequest {
    PaymentRequest {
        amount: Money::mxn(amount),
        payment_method: "efectivo".into(),
        reference: None,
        notes: None,
    }
}

async fn assert_reconciled(f: &Fixture, id: CreditAccountId) {
    let account = f.ledger.get_account(id).await.unwrap();
    let transactions = f.ledger.list_transactions(id).await.unwrap();
    assert!(reconcile(&account, &transactions).unwrap().is_balanced());
    assert_eq!(
        account.available_credit().amount(),
        account.credit_limit.amount() - account.current_balance.amount()
    );
}

// ============================================================================
// Account Opening
// ============================================================================

mod opening {
    use super::*;

    #[tokio::test]
    async fn test_open_account_defaults() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(50000)), "Admin").await.unwrap();

        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.current_balance.is_zero());
        assert_eq!(account.available_credit(), Money::mxn(dec!(50000)));
        assert!(account.last_payment_at.is_none());
        assert_eq!(account.interest_rate.map(|r| r.as_percentage()), Some(dec!(2.5)));
    }

    #[tokio::test]
    async fn test_open_rejects_negative_limit() {
        let f = fixture().await;
        let result = f.service.open_account(open(f.customer_id, dec!(-1)), "Admin").await;
        assert!(matches!(result, Err(CreditError::Validation(_))));
    }

    #[tokio::test]
    async fn test_open_rejects_terms_outside_set() {
        let f = fixture().await;
        let mut request = open(f.customer_id, dec!(1000));
        request.payment_terms_days = 7;
        let result = f.service.open_account(request, "Admin").await;
        assert!(matches!(result, Err(CreditError::Validation(_))));
    }

    #[tokio::test]
    async fn test_customer_may_hold_several_accounts() {
        let f = fixture().await;
        f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();
        f.service.open_account(open(f.customer_id, dec!(2000)), "Admin").await.unwrap();

        let accounts = f.service.list_accounts(AccountQuery::by_customer(f.customer_id)).await.unwrap();
        assert_eq!(accounts.len(), 2);
    }

    #[tokio::test]
    async fn test_accounts_searchable_by_customer_name() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();
        assert_eq!(account.customer_name.as_deref(), Some("Ferretería Hernández"));

        let found = f.service.list_accounts(AccountQuery::by_customer_name("hernández")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, account.id);
        assert_eq!(found[0].customer_name.as_deref(), Some("Ferretería Hernández"));

        let none = f.service.list_accounts(AccountQuery::by_customer_name("Mari")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_limit_above_storable_maximum() {
        let f = fixture().await;
        let result = f.service.open_account(open(f.customer_id, dec!(1000000000000)), "Admin").await;
        assert!(matches!(result, Err(CreditError::Validation(_))));
    }
}

// ============================================================================
// Postings
// ============================================================================

mod postings {
    use super::*;

    #[tokio::test]
    async fn test_charge_then_full_payment_restores_credit() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(50000)), "Admin").await.unwrap();

        f.service.apply_charge(account.id, charge(dec!(5000)), "Admin").await.unwrap();
        let outcome = f.service.apply_payment(account.id, payment(dec!(5000)), "Admin").await.unwrap();

        assert!(outcome.account.current_balance.is_zero());
        assert_eq!(outcome.account.available_credit(), Money::mxn(dec!(50000)));
        assert_eq!(outcome.transaction.kind, TransactionKind::Payment);
        assert_eq!(outcome.transaction.amount, Money::mxn(dec!(-5000)));
        assert_eq!(outcome.account.last_payment_at, Some(f.clock.now()));
        assert_reconciled(&f, account.id).await;
    }

    #[tokio::test]
    async fn test_overpayment_leaves_no_trace() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(50000)), "Admin").await.unwrap();
        f.service.apply_charge(account.id, charge(dec!(300)), "Admin").await.unwrap();
        let before = f.ledger.get_account(account.id).await.unwrap();

        let result = f.service.apply_payment(account.id, payment(dec!(300.01)), "Admin").await;

        assert!(matches!(result, Err(CreditError::InvalidAmount { .. })));
        assert_eq!(f.ledger.get_account(account.id).await.unwrap(), before);
        assert_eq!(f.ledger.list_transactions(account.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_charge_rejected_and_balance_untouched() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();
        f.service.apply_charge(account.id, charge(dec!(1)), "Admin").await.unwrap();
        let before = f.ledger.get_account(account.id).await.unwrap();

        for amount in [Decimal::MAX, dec!(1000000000000)] {
            let result = f.service.apply_charge(account.id, charge(amount), "Admin").await;
            assert!(matches!(result, Err(CreditError::Validation(_))));
        }
        assert_eq!(f.ledger.get_account(account.id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_zero_and_negative_amounts_rejected() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();

        assert!(matches!(
            f.service.apply_charge(account.id, charge(dec!(0)), "Admin").await,
            Err(CreditError::Validation(_))
        ));
        assert!(matches!(
            f.service.apply_payment(account.id, payment(dec!(-10)), "Admin").await,
            Err(CreditError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_adjustments_move_balance_both_ways() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();

        let up = f
            .service
            .apply_adjustment(
                account.id,
                AdjustmentRequest {
                    amount: Money::mxn(dec!(150)),
                    description: "Cargo por flete".into(),
                    reference: None,
                },
                "Admin",
            )
            .await
            .unwrap();
        assert_eq!(up.account.current_balance, Money::mxn(dec!(150)));

        let down = f
            .service
            .apply_adjustment(
                account.id,
                AdjustmentRequest {
                    amount: Money::mxn(dec!(-50)),
                    description: "Bonificación".into(),
                    reference: None,
                },
                "Admin",
            )
            .await
            .unwrap();
        assert_eq!(down.account.current_balance, Money::mxn(dec!(100)));
        assert_eq!(down.transaction.kind, TransactionKind::Adjustment);
        // Adjustments are not sent to the customer
        assert!(f.notifier.sent().await.is_empty());
        assert_reconciled(&f, account.id).await;
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let f = fixture().await;
        let result = f.service.apply_charge(CreditAccountId::new(), charge(dec!(1)), "Admin").await;
        assert!(matches!(result, Err(CreditError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_storage_outage_is_a_dependency_error() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();
        f.ledger.set_unavailable(true);

        let result = f.service.apply_charge(account.id, charge(dec!(10)), "Admin").await;
        assert!(matches!(result, Err(CreditError::Dependency(e)) if e.is_transient()));
    }

    #[tokio::test]
    async fn test_stale_posting_is_rejected_as_conflict() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();

        let rules = PostingRules::default();
        let first = rules
            .apply(&account, PostingRequest::Charge(charge(dec!(10))), "caja-1", Utc::now())
            .unwrap();
        let second = rules
            .apply(&account, PostingRequest::Charge(charge(dec!(20))), "caja-2", Utc::now())
            .unwrap();

        f.ledger.record_posting(&first).await.unwrap();
        let err = f.ledger.record_posting(&second).await.unwrap_err();
        assert!(err.is_conflict());

        let stored = f.ledger.get_account(account.id).await.unwrap();
        assert_eq!(stored.current_balance, Money::mxn(dec!(10)));
        assert_reconciled(&f, account.id).await;
    }
}

// ============================================================================
// Limit Warnings
// ============================================================================

mod warnings {
    use super::*;

    #[tokio::test]
    async fn test_near_limit_after_payment_at_42000() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(50000)), "Admin").await.unwrap();
        f.service.apply_charge(account.id, charge(dec!(43000)), "Admin").await.unwrap();

        let outcome = f.service.apply_payment(account.id, payment(dec!(1000)), "Admin").await.unwrap();
        assert_eq!(outcome.account.current_balance, Money::mxn(dec!(42000)));
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, LedgerWarning::NearLimit { .. })));
    }

    #[tokio::test]
    async fn test_no_warning_at_exactly_eighty_percent() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(50000)), "Admin").await.unwrap();
        f.service.apply_charge(account.id, charge(dec!(41000)), "Admin").await.unwrap();

        let outcome = f.service.apply_payment(account.id, payment(dec!(1000)), "Admin").await.unwrap();
        assert_eq!(outcome.account.current_balance, Money::mxn(dec!(40000)));
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_over_limit_charge_flagged_and_counted() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();

        let outcome = f.service.apply_charge(account.id, charge(dec!(1200)), "Admin").await.unwrap();
        assert!(matches!(outcome.warnings[0], LedgerWarning::OverLimit { .. }));
        assert_eq!(outcome.account.available_credit(), Money::mxn(dec!(-200)));

        let summary = f.service.portfolio_summary().await.unwrap();
        assert_eq!(summary.over_limit_count, 1);
    }
}

// ============================================================================
// Notifications
// ============================================================================

mod notifications {
    use super::*;

    #[tokio::test]
    async fn test_payment_notice_sent_to_customer_phone() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(50000)), "Admin").await.unwrap();
        f.service.apply_charge(account.id, charge(dec!(5000)), "Admin").await.unwrap();
        f.service.apply_payment(account.id, payment(dec!(2000)), "Admin").await.unwrap();

        let sent = f.notifier.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].recipient, "+525511112222");
        assert!(sent[1].text.contains("Pago Recibido"));
        assert!(sent[1].text.contains("$ 3000.00"));
    }

    #[tokio::test]
    async fn test_customer_without_phone_is_skipped_silently() {
        let f = fixture_with(CreditPolicy::default(), None).await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();

        let outcome = f.service.apply_charge(account.id, charge(dec!(10)), "Admin").await.unwrap();
        assert!(outcome.warnings.is_empty());
        assert!(f.notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_slow_gateway_times_out_into_warning() {
        let policy = CreditPolicy::default().with_notification_timeout(Duration::from_millis(50));
        let f = fixture_with(policy, Some("+525500000000")).await;
        f.notifier.set_delay(Some(Duration::from_millis(500))).await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();

        let outcome = f.service.apply_charge(account.id, charge(dec!(10)), "Admin").await.unwrap();

        assert_eq!(outcome.account.current_balance, Money::mxn(dec!(10)));
        assert!(matches!(
            outcome.warnings.as_slice(),
            [LedgerWarning::NotificationFailed { reason }] if reason.contains("timed out")
        ));
        assert_reconciled(&f, account.id).await;
    }
}

// ============================================================================
// Status Management
// ============================================================================

mod status {
    use super::*;

    #[tokio::test]
    async fn test_suspended_account_blocks_charges_only() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();
        f.service.apply_charge(account.id, charge(dec!(100)), "Admin").await.unwrap();

        let suspended = f
            .service
            .change_status(account.id, AccountStatus::Suspended, "Admin")
            .await
            .unwrap();
        assert_eq!(suspended.status, AccountStatus::Suspended);

        assert!(matches!(
            f.service.apply_charge(account.id, charge(dec!(1)), "Admin").await,
            Err(CreditError::AccountNotActive { .. })
        ));
        assert!(f.service.apply_payment(account.id, payment(dec!(100)), "Admin").await.is_ok());
    }

    #[tokio::test]
    async fn test_close_requires_zero_balance() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(1000)), "Admin").await.unwrap();
        f.service.apply_charge(account.id, charge(dec!(100)), "Admin").await.unwrap();

        assert!(matches!(
            f.service.change_status(account.id, AccountStatus::Closed, "Admin").await,
            Err(CreditError::Validation(_))
        ));

        f.service.apply_payment(account.id, payment(dec!(100)), "Admin").await.unwrap();
        let closed = f.service.change_status(account.id, AccountStatus::Closed, "Admin").await.unwrap();
        assert_eq!(closed.status, AccountStatus::Closed);

        assert!(matches!(
            f.service.apply_payment(account.id, payment(dec!(1)), "Admin").await,
            Err(CreditError::AccountNotActive { .. })
        ));
    }
}

// ============================================================================
// Statements, Aging, and Portfolio
// ============================================================================

mod reporting {
    use super::*;

    #[tokio::test]
    async fn test_statement_for_unknown_account_is_empty() {
        let f = fixture().await;
        let statement = f.service.statement(CreditAccountId::new()).await.unwrap();
        assert!(statement.is_empty());
    }

    #[tokio::test]
    async fn test_aging_tracks_clock() {
        let f = fixture().await;
        let account = f.service.open_account(open(f.customer_id, dec!(50000)), "Admin").await.unwrap();
        f.service.apply_charge(account.id, charge(dec!(1000)), "Admin").await.unwrap();
        f.clock.advance(ChronoDuration::days(40));
        f.service.apply_charge(account.id, charge(dec!(500)), "Admin").await.unwrap();
        f.clock.advance(ChronoDuration::days(60));

        let aging = f.service.account_aging(account.id).await.unwrap();
        assert_eq!(aging.over_90, Money::mxn(dec!(1000)));
        assert_eq!(aging.days_31_60, Money::mxn(dec!(500)));
        assert_eq!(aging.total().unwrap(), Money::mxn(dec!(1500)));

        let portfolio = f.service.portfolio_aging().await.unwrap();
        assert_eq!(portfolio, aging);
    }

    #[tokio::test]
    async fn test_portfolio_summary_totals() {
        let f = fixture().await;
        let a = f.service.open_account(open(f.customer_id, dec!(50000)), "Admin").await.unwrap();
        let b = f.service.open_account(open(f.customer_id, dec!(30000)), "Admin").await.unwrap();
        f.service.apply_charge(a.id, charge(dec!(42000)), "Admin").await.unwrap();
        f.service.apply_charge(b.id, charge(dec!(6000)), "Admin").await.unwrap();

        let summary = f.service.portfolio_summary().await.unwrap();
        assert_eq!(summary.account_count, 2);
        assert_eq!(summary.total_credit_limit, Money::mxn(dec!(80000)));
        assert_eq!(summary.total_outstanding, Money::mxn(dec!(48000)));
        assert_eq!(summary.total_available, Money::mxn(dec!(32000)));
        assert_eq!(summary.utilization, dec!(0.6));
        assert_eq!(summary.near_limit_count, 1);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Charge(i64),
        Pay(i64),
        Adjust(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1i64..500_000).prop_map(Op::Charge),
            (1i64..500_000).prop_map(Op::Pay),
            (-200_000i64..200_000).prop_filter("non-zero", |c| *c != 0).prop_map(Op::Adjust),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn ledger_always_reconciles(ops in proptest::collection::vec(op(), 1..40)) {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(async {
                let f = fixture_with(CreditPolicy::default(), None).await;
                let account = f.service.open_account(open(f.customer_id, dec!(10000)), "Admin").await.unwrap();

                for op in ops {
                    let before = f.ledger.get_account(account.id).await.unwrap();
                    let result = match op {
                        Op::Charge(c) => f.service.apply_charge(account.id, charge(Decimal::new(c, 2)), "Admin").await,
                        Op::Pay(c) => f.service.apply_payment(account.id, payment(Decimal::new(c, 2)), "Admin").await,
                        Op::Adjust(c) => f.service.apply_adjustment(account.id, AdjustmentRequest {
                            amount: Money::mxn(Decimal::new(c, 2)),
                            description: "Ajuste".into(),
                            reference: None,
                        }, "Admin").await,
                    };
                    let after = f.ledger.get_account(account.id).await.unwrap();
                    match result {
                        Ok(_) => assert!(!after.current_balance.is_negative()),
                        Err(CreditError::InvalidAmount { .. }) => assert_eq!(before, after),
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                    assert_reconciled(&f, account.id).await;
                }
            });
        }
    }
}
