//! Business time handling
//!
//! The store operates on local calendar days: a "corte Z" belongs to the
//! business date in the store's timezone, and receivable aging counts whole
//! local days. This module provides:
//! - A `Clock` abstraction so services can be driven by a fixed instant in tests
//! - A serializable `Timezone` wrapper over `chrono_tz`
//! - A `BusinessCalendar` that maps instants onto business dates

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::RwLock;
use thiserror::Error;

/// Default timezone for store operations
pub const DEFAULT_BUSINESS_TIMEZONE: Tz = chrono_tz::America::Mexico_City;

/// Errors related to time handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Local time {0} does not exist in {1}")]
    NonexistentLocalTime(String, String),
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Moves the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut guard) = self.instant.write() {
            *guard = instant;
        }
    }

    /// Moves the clock forward by `duration`
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut guard) = self.instant.write() {
            *guard += duration;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Timezone wrapper for store locations
///
/// Wraps chrono_tz::Tz with serialization as the IANA name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s.trim())
            .map(Timezone)
            .map_err(|_| ClockError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the IANA name
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Gets the start of day (first valid local instant) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, ClockError> {
        date.and_hms_opt(0, 0, 0)
            .and_then(|naive| naive.and_local_timezone(self.0).earliest())
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| ClockError::NonexistentLocalTime(date.to_string(), self.name().into()))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(DEFAULT_BUSINESS_TIMEZONE)
    }
}

/// Maps instants onto the store's business calendar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendar {
    pub timezone: Timezone,
}

impl BusinessCalendar {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }

    /// Returns the local calendar date of `instant`
    pub fn business_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.timezone.to_local(instant).date_naive()
    }

    /// Whole local calendar days from `earlier` to `later`
    ///
    /// Negative when `later` precedes `earlier`.
    pub fn days_between(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
        (self.business_date(later) - self.business_date(earlier)).num_days()
    }
}
