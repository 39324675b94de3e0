//! Property-Based Test Generators
//!
//! Proptest strategies that produce ledger requests and drawer counts
//! satisfying the domain's input rules (whole cents, known currencies).

use proptest::prelude::*;

use core_kernel::{Currency, Money};
use domain_cash::CashCount;
use domain_credit::{
    AccountStatus, AdjustmentRequest, ChargeRequest, PaymentRequest, PaymentTerms, PostingRequest,
};

/// Strategy for whole-cent peso amounts between 0.01 and 100,000.00
pub fn mxn_amount_strategy() -> impl Strategy<Value = Money> {
    (1i64..10_000_000i64).prop_map(|cents| Money::from_minor(cents, Currency::MXN))
}

/// Strategy for credit limits between 500.00 and 200,000.00
pub fn credit_limit_strategy() -> impl Strategy<Value = Money> {
    (50_000i64..20_000_000i64).prop_map(|cents| Money::from_minor(cents, Currency::MXN))
}

/// Strategy for non-zero signed adjustments up to 5,000.00 either way
pub fn adjustment_amount_strategy() -> impl Strategy<Value = Money> {
    prop_oneof![(1i64..500_000i64), (-500_000i64..-1i64)]
        .prop_map(|cents| Money::from_minor(cents, Currency::MXN))
}

pub fn payment_terms_strategy() -> impl Strategy<Value = PaymentTerms> {
    prop_oneof![
        Just(PaymentTerms::Days15),
        Just(PaymentTerms::Days30),
        Just(PaymentTerms::Days45),
        Just(PaymentTerms::Days60),
        Just(PaymentTerms::Days90),
    ]
}

pub fn account_status_strategy() -> impl Strategy<Value = AccountStatus> {
    prop_oneof![
        Just(AccountStatus::Active),
        Just(AccountStatus::Suspended),
        Just(AccountStatus::Closed),
    ]
}

pub fn payment_method_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("efectivo".to_string()),
        Just("transferencia".to_string()),
        Just("tarjeta".to_string()),
    ]
}

/// Strategy for a single charge, payment, or adjustment request
pub fn posting_request_strategy() -> impl Strategy<Value = PostingRequest> {
    prop_oneof![
        3 => mxn_amount_strategy().prop_map(|amount| PostingRequest::Charge(ChargeRequest {
            amount,
            description: "Compra a crédito".to_string(),
            reference: None,
        })),
        2 => (mxn_amount_strategy(), payment_method_strategy()).prop_map(|(amount, method)| {
            PostingRequest::Payment(PaymentRequest {
                amount,
                payment_method: method,
                reference: None,
                notes: None,
            })
        }),
        1 => adjustment_amount_strategy().prop_map(|amount| {
            PostingRequest::Adjustment(AdjustmentRequest {
                amount,
                description: "Ajuste".to_string(),
                reference: None,
            })
        }),
    ]
}

/// Strategy for a sequence of ledger requests
pub fn posting_sequence_strategy(max_len: usize) -> impl Strategy<Value = Vec<PostingRequest>> {
    prop::collection::vec(posting_request_strategy(), 1..=max_len)
}

/// Strategy for a valid drawer count
pub fn cash_count_strategy() -> impl Strategy<Value = CashCount> {
    (0i64..5_000_000i64, 0i64..100_000i64).prop_map(|(mxn, usd)| CashCount {
        mxn: Money::from_minor(mxn, Currency::MXN),
        usd: Money::from_minor(usd, Currency::USD),
    })
}

/// Strategy for Mexican mobile numbers in E.164 form
pub fn phone_strategy() -> impl Strategy<Value = String> {
    (10_000_000u32..99_999_999u32).prop_map(|line| format!("+5255{line}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::CreditAccountBuilder;
    use crate::fixtures::{CustomerFixtures, IdFixtures, TemporalFixtures};
    use domain_cash::DailyOperation;
    use domain_credit::{reconcile, CreditAccount, OpenAccountRequest, PostingRules};

    proptest! {
        #[test]
        fn ledger_balance_is_never_negative_and_always_reconciles(
            limit in credit_limit_strategy(),
            requests in posting_sequence_strategy(30),
        ) {
            let rules = PostingRules::default();
            let mut account = CreditAccountBuilder::new().with_limit(limit.amount()).build();
            let mut ledger = Vec::new();
            let now = TemporalFixtures::store_open();

            for request in requests {
                if let Ok(posting) = rules.apply(&account, request, "Admin", now) {
                    prop_assert_eq!(posting.expected_version, account.version);
                    prop_assert_eq!(posting.account.version, account.version + 1);
                    account = posting.account;
                    ledger.push(posting.transaction);
                }
                prop_assert!(!account.current_balance.is_negative());
            }

            prop_assert!(reconcile(&account, &ledger).unwrap().is_balanced());
            prop_assert_eq!(account.version, 1 + ledger.len() as i64);
        }

        #[test]
        fn payment_never_exceeds_balance(
            balance in mxn_amount_strategy(),
            payment in mxn_amount_strategy(),
        ) {
            let rules = PostingRules::default();
            let account = CreditAccountBuilder::new().with_balance(balance.amount()).build();
            let result = rules.apply(
                &account,
                PostingRequest::Payment(PaymentRequest {
                    amount: payment,
                    payment_method: "efectivo".to_string(),
                    reference: None,
                    notes: None,
                }),
                "Admin",
                TemporalFixtures::store_open(),
            );
            prop_assert_eq!(result.is_ok(), payment.amount() <= balance.amount());
        }

        #[test]
        fn cash_movement_is_closing_minus_opening(
            opening in cash_count_strategy(),
            closing in cash_count_strategy(),
        ) {
            let mut op = DailyOperation::open(
                None,
                TemporalFixtures::business_date(),
                opening,
                "Admin",
                TemporalFixtures::store_open(),
            ).unwrap();
            prop_assert!(op.cash_movement().is_none());

            op.close(closing, "Admin", TemporalFixtures::store_open()).unwrap();
            let movement = op.cash_movement().unwrap();
            prop_assert_eq!(movement.mxn.amount(), closing.mxn.amount() - opening.mxn.amount());
            prop_assert_eq!(movement.usd.amount(), closing.usd.amount() - opening.usd.amount());
        }

        #[test]
        fn charges_only_post_to_active_accounts(
            status in account_status_strategy(),
            amount in mxn_amount_strategy(),
        ) {
            let account = CreditAccountBuilder::new().with_status(status).build();
            let result = PostingRules::default().apply(
                &account,
                PostingRequest::Charge(ChargeRequest {
                    amount,
                    description: "Compra".to_string(),
                    reference: None,
                }),
                "Admin",
                TemporalFixtures::store_open(),
            );
            prop_assert_eq!(result.is_ok(), status == AccountStatus::Active);
        }

        #[test]
        fn opened_accounts_keep_requested_terms(
            terms in payment_terms_strategy(),
            limit in credit_limit_strategy(),
        ) {
            let request = OpenAccountRequest {
                credit_limit: limit,
                payment_terms_days: terms.days(),
                ..CustomerFixtures::open_request(IdFixtures::customer_id())
            };
            let account = CreditAccount::open(request, Currency::MXN, TemporalFixtures::store_open()).unwrap();
            prop_assert_eq!(account.payment_terms, terms);
            prop_assert_eq!(account.available_credit(), limit);
        }

        #[test]
        fn generated_phones_are_e164(phone in phone_strategy()) {
            prop_assert!(phone.starts_with("+52"));
            prop_assert_eq!(phone.len(), 13);
        }
    }
}
