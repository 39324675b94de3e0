//! Tests for the business clock and calendar

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use core_kernel::{BusinessCalendar, Clock, FixedClock, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod calendar {
    use super::*;

    #[test]
    fn test_evening_sale_belongs_to_local_day() {
        let calendar = BusinessCalendar::default();
        // 21:30 local on the 1st is 03:30 UTC on the 2nd
        let instant = Utc.with_ymd_and_hms(2024, 6, 2, 3, 30, 0).unwrap();
        assert_eq!(calendar.business_date(instant), date(2024, 6, 1));
    }

    #[test]
    fn test_utc_calendar_matches_utc_date() {
        let calendar = BusinessCalendar::new(Timezone::new(chrono_tz::UTC));
        let instant = Utc.with_ymd_and_hms(2024, 6, 2, 3, 30, 0).unwrap();
        assert_eq!(calendar.business_date(instant), date(2024, 6, 2));
    }

    #[test]
    fn test_days_between_counts_local_days() {
        let calendar = BusinessCalendar::default();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        let later = earlier + Duration::days(31);
        assert_eq!(calendar.days_between(earlier, later), 31);
        assert_eq!(calendar.days_between(later, earlier), -31);
    }

    #[test]
    fn test_start_of_day_is_local_midnight() {
        let tz = Timezone::default();
        let start = tz.start_of_day(date(2024, 6, 1)).unwrap();
        // Mexico City has been UTC-6 year round since 2022
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap());
    }
}

mod timezone_serde {
    use super::*;

    #[test]
    fn test_serializes_as_iana_name() {
        let json = serde_json::to_string(&Timezone::default()).unwrap();
        assert_eq!(json, "\"America/Mexico_City\"");
    }

    #[test]
    fn test_deserialize_rejects_unknown_zone() {
        let result: Result<Timezone, _> = serde_json::from_str("\"Atlantis/Capital\"");
        assert!(result.is_err());
    }
}

#[test]
fn test_fixed_clock_set() {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    clock.set(later);
    assert_eq!(clock.now(), later);
}
