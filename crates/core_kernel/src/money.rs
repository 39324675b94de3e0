//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! Repeated charge/payment cycles never drift because every amount is a
//! fixed-point decimal carried together with its currency.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;
use thiserror::Error;

/// Currencies accepted at the register and on credit accounts (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Mexican peso, the ledger currency
    MXN,
    /// US dollar, accepted as cash at the register
    USD,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::MXN => "$",
            Currency::USD => "US$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::MXN => "MXN",
            Currency::USD => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MXN" => Ok(Currency::MXN),
            "USD" => Ok(Currency::USD),
            other => Err(MoneyError::UnsupportedCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

/// A monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally; inputs coming from
/// cashiers and customers are checked with [`Money::ensure_currency_precision`]
/// so that only whole cents ever reach the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Largest magnitude a stored amount may have (14 digits, 2 of them cents)
    pub const MAX_AMOUNT: Decimal = dec!(999_999_999_999.99);

    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates Money in Mexican pesos
    pub fn mxn(amount: Decimal) -> Self {
        Self::new(amount, Currency::MXN)
    }

    /// Creates Money in US dollars
    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, Currency::USD)
    }

    /// Creates Money from an integer amount in minor units (e.g., centavos)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor_units, currency.decimal_places()), currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Rounds to the currency's standard decimal places
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    /// Rejects amounts carrying more precision than the currency allows
    pub fn ensure_currency_precision(&self) -> Result<(), MoneyError> {
        if self.amount.normalize().scale() > self.currency.decimal_places() {
            return Err(MoneyError::InvalidAmount(format!(
                "{} has more than {} decimal places",
                self.amount,
                self.currency.decimal_places()
            )));
        }
        Ok(())
    }

    /// Rejects amounts in a different currency than `expected`
    pub fn ensure_currency(&self, expected: Currency) -> Result<(), MoneyError> {
        if self.currency != expected {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                expected.to_string(),
            ));
        }
        Ok(())
    }

    /// Rejects amounts whose magnitude exceeds [`Money::MAX_AMOUNT`]
    pub fn ensure_storable(&self) -> Result<(), MoneyError> {
        if self.amount.abs() > Self::MAX_AMOUNT {
            return Err(MoneyError::OutOfRange(format!(
                "{} exceeds {}",
                self.amount,
                Self::MAX_AMOUNT
            )));
        }
        Ok(())
    }

    /// Checked addition that returns an error on currency mismatch or overflow
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        other.ensure_currency(self.currency)?;
        let amount = self.amount.checked_add(other.amount).ok_or_else(|| {
            MoneyError::OutOfRange(format!("{} + {} overflows", self.amount, other.amount))
        })?;
        Ok(Self::new(amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch or overflow
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        other.ensure_currency(self.currency)?;
        let amount = self.amount.checked_sub(other.amount).ok_or_else(|| {
            MoneyError::OutOfRange(format!("{} - {} overflows", self.amount, other.amount))
        })?;
        Ok(Self::new(amount, self.currency))
    }

    /// Returns the smaller of two amounts in the same currency
    pub fn checked_min(&self, other: &Money) -> Result<Money, MoneyError> {
        other.ensure_currency(self.currency)?;
        Ok(if other.amount < self.amount { *other } else { *self })
    }

    /// Multiplies by a scalar (e.g., for threshold calculations)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount.saturating_mul(factor), self.currency)
    }

    /// Divides by another amount, yielding a plain ratio
    pub fn ratio_to(&self, denominator: &Money) -> Result<Decimal, MoneyError> {
        denominator.ensure_currency(self.currency)?;
        if denominator.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        self.amount
            .checked_div(denominator.amount)
            .ok_or_else(|| MoneyError::OutOfRange(format!("{} / {}", self.amount, denominator.amount)))
    }

    /// Sums an iterator of amounts, all of which must be in `currency`
    pub fn sum<'a, I>(items: I, currency: Currency) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        items
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

/// Represents a percentage rate (e.g., interest rate on a credit account)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.025 for 2.5%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 2.5 for 2.5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Returns true if the rate lies within 0% and 100% inclusive
    pub fn is_within_unit_interval(&self) -> bool {
        self.value >= Decimal::ZERO && self.value <= Decimal::ONE
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Money {
        money.multiply(self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4).normalize())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_sum_matches_decimal_sum(
            amounts in proptest::collection::vec(-1_000_000i64..1_000_000i64, 0..50)
        ) {
            let moneys: Vec<Money> = amounts
                .iter()
                .map(|a| Money::from_minor(*a, Currency::MXN))
                .collect();
            let total = Money::sum(&moneys, Currency::MXN).unwrap();

            let expected: Decimal = amounts.iter().map(|a| Decimal::new(*a, 2)).sum();
            prop_assert_eq!(total.amount(), expected);
        }

        #[test]
        fn money_addition_then_subtraction_is_identity(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
        ) {
            let ma = Money::from_minor(a, Currency::MXN);
            let mb = Money::from_minor(b, Currency::MXN);

            let back = ma.checked_add(&mb).unwrap().checked_sub(&mb).unwrap();
            prop_assert_eq!(back, ma);
        }
    }
}
