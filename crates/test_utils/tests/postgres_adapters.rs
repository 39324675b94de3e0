//! PostgreSQL adapter tests
//!
//! Need Docker or `TEST_DATABASE_URL`; run with `cargo test -- --ignored`.

use std::sync::Arc;

use chrono::Duration;
use rust_decimal_macros::dec;

use core_kernel::{BusinessCalendar, CustomerId, FixedClock, HealthCheckable, Money, PortError};
use domain_cash::{CashError, CashRegisterService, DailyOperationPort};
use domain_credit::{
    AccountQuery, AccountStatus, ChargeRequest, CreditLedgerPort, CreditLedgerService,
    CreditPolicy, CustomerDirectoryPort, PaymentRequest, PostingRequest, PostingRules,
};
use infra_db::{
    PostgresCreditLedgerAdapter, PostgresCustomerDirectory, PostgresDailyOperationAdapter,
    WhatsAppChatNotifier,
};
use test_utils::{
    assert_balance, assert_closed_with, assert_ledger_reconciles, db_test, CustomerFixtures,
    DailyOperationBuilder, MoneyFixtures, TemporalFixtures,
};

fn credit_service(db: &test_utils::TestDatabase, clock: Arc<FixedClock>) -> CreditLedgerService {
    let pool = db.pool().clone();
    CreditLedgerService::new(
        Arc::new(PostgresCreditLedgerAdapter::new(pool.clone())),
        Arc::new(PostgresCustomerDirectory::new(pool.clone())),
        Arc::new(WhatsAppChatNotifier::new(pool)),
        clock,
        BusinessCalendar::default(),
        CreditPolicy::default(),
    )
}

fn charge(amount: rust_decimal::Decimal) -> ChargeRequest {
    ChargeRequest {
        amount: Money::mxn(amount),
        description: "Block y cemento".to_string(),
        reference: Some("TICKET-1001".to_string()),
    }
}

db_test!(test_adapters_report_healthy, |db| {
    let ledger = PostgresCreditLedgerAdapter::new(db.pool().clone());
    let operations = PostgresDailyOperationAdapter::new(db.pool().clone());
    assert!(ledger.health_check().await.is_healthy());
    assert!(operations.health_check().await.is_healthy());
});

db_test!(test_ledger_roundtrip_and_reconciliation, |db| {
    let customer = db.seed_customer("Materiales Hernández", Some("+525511112222")).await.unwrap();
    let clock = Arc::new(TemporalFixtures::clock());
    let service = credit_service(&db, clock.clone());

    let account = service
        .open_account(CustomerFixtures::open_request(customer), "Admin")
        .await
        .unwrap();
    service.apply_charge(account.id, charge(dec!(2500.00)), "Lupita").await.unwrap();
    clock.advance(Duration::hours(2));
    let outcome = service
        .apply_payment(
            account.id,
            PaymentRequest {
                amount: Money::mxn(dec!(1000.00)),
                payment_method: "transferencia".to_string(),
                reference: None,
                notes: None,
            },
            "Lupita",
        )
        .await
        .unwrap();

    let stored = service.get_account(account.id).await.unwrap();
    assert_eq!(stored, outcome.account);
    assert_balance(&stored, dec!(1500.00));
    assert_eq!(stored.version, 3);
    assert_eq!(stored.last_payment_at, Some(TemporalFixtures::store_open() + Duration::hours(2)));

    let statement = service.statement(account.id).await.unwrap();
    let ledger: Vec<_> = statement.iter().cloned().collect();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[0].amount.amount(), dec!(2500.00));
    assert_eq!(ledger[1].amount.amount(), dec!(-1000.00));
    assert_eq!(ledger[1].created_by, "Lupita");
    assert_ledger_reconciles(&stored, &ledger);
});

db_test!(test_stale_version_is_rejected, |db| {
    let customer = db.seed_customer("Tlapalería Sánchez", None).await.unwrap();
    let service = credit_service(&db, Arc::new(TemporalFixtures::clock()));
    let account = service
        .open_account(CustomerFixtures::open_request(customer), "Admin")
        .await
        .unwrap();

    let ledger = PostgresCreditLedgerAdapter::new(db.pool().clone());
    let rules = PostingRules::default();
    let first = rules
        .apply(&account, PostingRequest::Charge(charge(dec!(100))), "caja-1", TemporalFixtures::store_open())
        .unwrap();
    let second = rules
        .apply(&account, PostingRequest::Charge(charge(dec!(200))), "caja-2", TemporalFixtures::store_open())
        .unwrap();

    ledger.record_posting(&first).await.unwrap();
    let result = ledger.record_posting(&second).await;
    assert!(matches!(result, Err(PortError::Conflict { .. })));

    let stored = ledger.get_account(account.id).await.unwrap();
    assert_balance(&stored, dec!(100));
    assert_eq!(ledger.list_transactions(account.id).await.unwrap().len(), 1);
});

db_test!(test_status_and_name_filters_and_unknown_account, |db| {
    let customer = db.seed_customer("Vidrios La Luz", None).await.unwrap();
    let service = credit_service(&db, Arc::new(TemporalFixtures::clock()));
    let account = service
        .open_account(CustomerFixtures::open_request(customer), "Admin")
        .await
        .unwrap();
    service.change_status(account.id, AccountStatus::Suspended, "Admin").await.unwrap();

    let ledger = PostgresCreditLedgerAdapter::new(db.pool().clone());
    let suspended = ledger
        .find_accounts(AccountQuery { status: Some(AccountStatus::Suspended), ..AccountQuery::default() })
        .await
        .unwrap();
    assert_eq!(suspended.len(), 1);
    let active = ledger
        .find_accounts(AccountQuery { status: Some(AccountStatus::Active), ..AccountQuery::default() })
        .await
        .unwrap();
    assert!(active.is_empty());

    let by_name = ledger.find_accounts(AccountQuery::by_customer_name("la luz")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].customer_name.as_deref(), Some("Vidrios La Luz"));
    let wildcard = ledger.find_accounts(AccountQuery::by_customer_name("%")).await.unwrap();
    assert!(wildcard.is_empty());

    let missing = ledger.get_account(core_kernel::CreditAccountId::new()).await;
    assert!(matches!(missing, Err(PortError::NotFound { .. })));
});

db_test!(test_notice_lands_in_chat_inbox, |db| {
    let customer = db.seed_customer("Pinturas Reyes", Some("+525533334444")).await.unwrap();
    let service = credit_service(&db, Arc::new(TemporalFixtures::clock()));
    let account = service
        .open_account(CustomerFixtures::open_request(customer), "Admin")
        .await
        .unwrap();

    service.apply_charge(account.id, charge(dec!(300)), "Admin").await.unwrap();
    service.apply_charge(account.id, charge(dec!(450)), "Admin").await.unwrap();

    let notifier = WhatsAppChatNotifier::new(db.pool().clone());
    let chat = notifier
        .repository()
        .find_by_phone("+525533334444")
        .await
        .unwrap()
        .expect("chat row");
    assert_eq!(chat.status, "responded");
    assert_eq!(chat.unread_count, 0);
    assert_eq!(chat.customer_id, Some(uuid::Uuid::from(customer)));
    assert!(chat.last_message.contains("$ 450.00"));
});

db_test!(test_directory_treats_blank_phone_as_missing, |db| {
    let with_blank = db.seed_customer("Sin Teléfono", Some("  ")).await.unwrap();
    let directory = PostgresCustomerDirectory::new(db.pool().clone());

    let contact = directory.get_contact(with_blank).await.unwrap().unwrap();
    assert_eq!(contact.phone, None);
    assert!(directory.get_contact(CustomerId::new()).await.unwrap().is_none());
});

db_test!(test_one_operation_per_branch_and_day, |db| {
    let operations = PostgresDailyOperationAdapter::new(db.pool().clone());

    let first = DailyOperationBuilder::new().build();
    let duplicate = DailyOperationBuilder::new().opened_by("Beto").build();
    operations.insert(&first).await.unwrap();
    assert!(matches!(
        operations.insert(&duplicate).await,
        Err(PortError::Conflict { .. })
    ));

    let other_branch = DailyOperationBuilder::new()
        .for_branch(core_kernel::BranchId::new())
        .build();
    operations.insert(&other_branch).await.unwrap();

    let stored = operations
        .find_by_date(None, TemporalFixtures::business_date())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, first);
});

db_test!(test_register_close_is_final, |db| {
    let clock = Arc::new(TemporalFixtures::clock());
    let operations = Arc::new(PostgresDailyOperationAdapter::new(db.pool().clone()));
    let service = CashRegisterService::new(operations.clone(), clock.clone(), BusinessCalendar::default());

    service.open(None, MoneyFixtures::opening_float(), "Admin").await.unwrap();
    clock.advance(Duration::hours(10));
    let closed = service.close(None, MoneyFixtures::closing_count(), "Admin").await.unwrap();
    assert_closed_with(&closed, dec!(4230.00));

    assert!(matches!(operations.close(&closed).await, Err(PortError::Conflict { .. })));

    assert!(matches!(
        service.close(None, MoneyFixtures::closing_count(), "Admin").await,
        Err(CashError::NotOpen { .. })
    ));

    let history = service
        .history(None, TemporalFixtures::business_date(), TemporalFixtures::business_date())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_closed_with(&history[0], dec!(4230.00));
});
