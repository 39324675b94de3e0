//! Unit tests for the Money module
//!
//! Tests cover money creation, checked arithmetic, precision rules,
//! currency handling, and rates.

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::MXN);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::USD);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::USD);
    }

    #[test]
    fn test_negative_amount_creation() {
        let m = Money::mxn(dec!(-5000.00));
        assert!(m.is_negative());
        assert!(!m.is_positive());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_charge_then_payment_returns_to_zero() {
        let balance = Money::zero(Currency::MXN);
        let after_charge = balance.checked_add(&Money::mxn(dec!(5000.00))).unwrap();
        let after_payment = after_charge.checked_sub(&Money::mxn(dec!(5000.00))).unwrap();
        assert!(after_payment.is_zero());
    }

    #[test]
    fn test_checked_sub_currency_mismatch() {
        let result = Money::mxn(dec!(10)).checked_sub(&Money::usd(dec!(1)));
        assert_eq!(
            result,
            Err(MoneyError::CurrencyMismatch("USD".to_string(), "MXN".to_string()))
        );
    }

    #[test]
    fn test_checked_min_picks_smaller() {
        let a = Money::mxn(dec!(50000));
        let b = Money::mxn(dec!(49999.99));
        assert_eq!(a.checked_min(&b).unwrap(), b);
    }

    #[test]
    fn test_neg_flips_sign() {
        let payment = -Money::mxn(dec!(120.50));
        assert_eq!(payment.amount(), dec!(-120.50));
    }

    #[test]
    fn test_ratio_to_zero_is_error() {
        let result = Money::mxn(dec!(1)).ratio_to(&Money::zero(Currency::MXN));
        assert_eq!(result, Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_ratio_to() {
        let outstanding = Money::mxn(dec!(42000));
        let limit = Money::mxn(dec!(50000));
        assert_eq!(outstanding.ratio_to(&limit).unwrap(), dec!(0.84));
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total = Money::sum(&[], Currency::MXN).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_repeated_cents_do_not_drift() {
        let cent = Money::mxn(dec!(0.01));
        let items = vec![cent; 10_000];
        let total = Money::sum(&items, Currency::MXN).unwrap();
        assert_eq!(total.amount(), dec!(100.00));
    }
}

mod precision {
    use super::*;

    #[test]
    fn test_whole_cents_accepted() {
        assert!(Money::mxn(dec!(4230)).ensure_currency_precision().is_ok());
        assert!(Money::usd(dec!(0.99)).ensure_currency_precision().is_ok());
    }

    #[test]
    fn test_fraction_of_cent_rejected() {
        let result = Money::mxn(dec!(0.001)).ensure_currency_precision();
        assert!(matches!(result, Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_round_to_currency() {
        let m = Money::mxn(dec!(10.125)).round_to_currency();
        assert_eq!(m.amount(), dec!(10.12));
    }
}

mod currency {
    use super::*;

    #[test]
    fn test_parse_currency_codes() {
        assert_eq!("mxn".parse::<Currency>().unwrap(), Currency::MXN);
        assert_eq!(" USD ".parse::<Currency>().unwrap(), Currency::USD);
        assert!(matches!(
            "EUR".parse::<Currency>(),
            Err(MoneyError::UnsupportedCurrency(_))
        ));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Money::mxn(dec!(10)).to_string(), "$ 10.00");
        assert_eq!(Money::usd(dec!(50)).to_string(), "US$ 50.00");
    }

    #[test]
    fn test_serde_uses_uppercase_codes() {
        let json = serde_json::to_string(&Currency::MXN).unwrap();
        assert_eq!(json, "\"MXN\"");
    }
}

mod rate {
    use super::*;

    #[test]
    fn test_percentage_round_trip() {
        let rate = Rate::from_percentage(dec!(3.5));
        assert_eq!(rate.as_decimal(), dec!(0.035));
        assert_eq!(rate.as_percentage(), dec!(3.5));
    }

    #[test]
    fn test_unit_interval() {
        assert!(Rate::from_percentage(dec!(0)).is_within_unit_interval());
        assert!(Rate::from_percentage(dec!(100)).is_within_unit_interval());
        assert!(!Rate::from_percentage(dec!(120)).is_within_unit_interval());
        assert!(!Rate::new(Decimal::NEGATIVE_ONE).is_within_unit_interval());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rate::from_percentage(dec!(2.5)).to_string(), "2.5%");
    }
}
