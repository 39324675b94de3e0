//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the credit ledger and the cash register.
//! Fixed values keep unit tests predictable; the `fake`-backed helpers
//! are for tests that only need "some" customer.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{BranchId, CustomerId, FixedClock, Money};
use domain_cash::CashCount;
use domain_credit::{CustomerContact, OpenAccountRequest};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard credit limit
    pub fn mxn_limit() -> Money {
        Money::mxn(dec!(10000.00))
    }

    /// A typical purchase on credit
    pub fn mxn_charge() -> Money {
        Money::mxn(dec!(1250.50))
    }

    /// A partial payment of the standard charge
    pub fn mxn_payment() -> Money {
        Money::mxn(dec!(500.00))
    }

    pub fn mxn_zero() -> Money {
        Money::mxn(dec!(0))
    }

    /// For currency mismatch tests
    pub fn usd_100() -> Money {
        Money::usd(dec!(100.00))
    }

    /// Opening float for the register
    pub fn opening_float() -> CashCount {
        CashCount {
            mxn: Money::mxn(dec!(1000.00)),
            usd: Money::usd(dec!(50.00)),
        }
    }

    /// End-of-day count after a normal day of sales
    pub fn closing_count() -> CashCount {
        CashCount {
            mxn: Money::mxn(dec!(4230.00)),
            usd: Money::usd(dec!(50.00)),
        }
    }
}

/// Fixture for temporal test data
///
/// Instants are in UTC; the store runs on America/Mexico_City.
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// 09:00 local on 2024-07-01
    pub fn store_open() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 15, 0, 0).unwrap()
    }

    /// 22:30 local on 2024-06-30, already July 1 in UTC
    pub fn late_evening() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 4, 30, 0).unwrap()
    }

    pub fn business_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    /// A clock pinned to `store_open`
    pub fn clock() -> FixedClock {
        FixedClock::new(Self::store_open())
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Deterministic customer ID
    pub fn customer_id() -> CustomerId {
        CustomerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Deterministic branch ID
    pub fn branch_id() -> BranchId {
        BranchId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }
}

/// Fixture for customers
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// Known customer with a WhatsApp number
    pub fn contact() -> CustomerContact {
        CustomerContact {
            customer_id: IdFixtures::customer_id(),
            name: "Ferretería El Martillo".to_string(),
            phone: Some("+525512345678".to_string()),
        }
    }

    /// Customer without a phone on file
    pub fn contact_without_phone() -> CustomerContact {
        CustomerContact {
            phone: None,
            ..Self::contact()
        }
    }

    /// Fresh customer with a random name and Mexican mobile number
    pub fn random_contact() -> CustomerContact {
        let line: u32 = (10_000_000..99_999_999).fake();
        CustomerContact {
            customer_id: CustomerId::new(),
            name: Name().fake(),
            phone: Some(format!("+5255{line}")),
        }
    }

    /// Request to open a standard account for `customer_id`
    pub fn open_request(customer_id: CustomerId) -> OpenAccountRequest {
        OpenAccountRequest {
            customer_id,
            credit_limit: MoneyFixtures::mxn_limit(),
            payment_terms_days: 30,
            notes: None,
            interest_rate: None,
        }
    }
}
