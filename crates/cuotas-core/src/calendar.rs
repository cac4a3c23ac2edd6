//! Local-calendar-safe parsing of membership dates and payment timestamps.
//!
//! Day-precision strings are read from their literal components and never
//! handed to a parser that assumes UTC: `2023-11-01` read as UTC midnight is
//! still October 31 in any zone west of Greenwich.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use cuotas_domain::MonthKey;

use crate::time::Clock;

/// Shift applied to full timestamps before the month is extracted. Moves
/// "previous day 22:00" to "current day 10:00" and "00:00" to "12:00".
const HALF_DAY_HOURS: i64 = 12;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const LOOSE_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Reads a strict `YYYY-MM-DD` prefix as a calendar date, ignoring whatever
/// follows it (typically a time component).
pub fn literal_date_prefix(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    if bytes.len() < 10 {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if !(digits(0..4) && bytes[4] == b'-' && digits(5..7) && bytes[7] == b'-' && digits(8..10)) {
        return None;
    }
    let year = raw[0..4].parse().ok()?;
    let month = raw[5..7].parse().ok()?;
    let day = raw[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a membership date without falling back.
///
/// Order: literal `YYYY-MM-DD` prefix, RFC 3339 timestamp converted to local
/// time, then `DD/MM/YYYY`, `YYYY/MM/DD` and `DD-MM-YYYY`.
pub fn try_parse_calendar_date(raw: &str, clock: &dyn Clock) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Some(date) = literal_date_prefix(trimmed) {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(clock.to_local(stamp.with_timezone(&Utc)).date());
    }
    LOOSE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Best-effort membership date parse. Unreadable input resolves to today.
pub fn parse_calendar_date(raw: &str, clock: &dyn Clock) -> NaiveDate {
    match try_parse_calendar_date(raw, clock) {
        Some(date) => date,
        None => {
            let today = clock.today();
            warn!(input = raw, fallback = %today, "unreadable date, using today");
            today
        }
    }
}

/// Reduces a payment timestamp to the month a user in the clock's zone
/// considers "this payment's month".
///
/// - `YYYY-MM` is taken as is.
/// - `YYYY-MM-DD` uses its literal components.
/// - Full timestamps are converted to local time, shifted by half a day, and
///   only then reduced to (year, month). Slicing the first seven characters
///   would yield the UTC month instead.
/// - Anything else goes through [`parse_calendar_date`].
pub fn normalize_payment_month(raw: &str, clock: &dyn Clock) -> MonthKey {
    let trimmed = raw.trim();
    if let Ok(key) = MonthKey::from_str(trimmed) {
        return key;
    }
    if trimmed.len() == 10 {
        if let Some(date) = literal_date_prefix(trimmed) {
            return MonthKey::from_date(date);
        }
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        let local = clock.to_local(stamp.with_timezone(&Utc));
        return month_after_half_day(local);
    }
    if let Some(local) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return month_after_half_day(local);
    }
    MonthKey::from_date(parse_calendar_date(trimmed, clock))
}

fn month_after_half_day(local: NaiveDateTime) -> MonthKey {
    let shifted = local
        .checked_add_signed(Duration::hours(HALF_DAY_HOURS))
        .unwrap_or(local);
    MonthKey::from_date(shifted.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap())
    }

    #[test]
    fn literal_prefix_ignores_time_component() {
        let expected = NaiveDate::from_ymd_opt(2023, 11, 1);
        assert_eq!(literal_date_prefix("2023-11-01"), expected);
        assert_eq!(literal_date_prefix("2023-11-01T00:00:00.000Z"), expected);
        assert_eq!(literal_date_prefix("2023-02-30"), None);
        assert_eq!(literal_date_prefix("2023/11/01"), None);
        assert_eq!(literal_date_prefix("2023-11"), None);
    }

    #[test]
    fn utc_midnight_date_stays_on_its_calendar_day_west_of_greenwich() {
        let west = clock().with_offset_hours(-5);
        assert_eq!(
            try_parse_calendar_date("2023-11-01T00:00:00.000Z", &west),
            NaiveDate::from_ymd_opt(2023, 11, 1)
        );
    }

    #[test]
    fn loose_formats_are_accepted() {
        let expected = NaiveDate::from_ymd_opt(2022, 1, 10);
        assert_eq!(try_parse_calendar_date("10/01/2022", &clock()), expected);
        assert_eq!(try_parse_calendar_date("2022/01/10", &clock()), expected);
        assert_eq!(try_parse_calendar_date(" 2022-01-10 ", &clock()), expected);
    }

    #[test]
    fn garbage_dates_fall_back_to_today() {
        assert_eq!(try_parse_calendar_date("mañana", &clock()), None);
        assert_eq!(
            parse_calendar_date("mañana", &clock()),
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
        );
        assert_eq!(parse_calendar_date("", &clock()), clock().today());
    }

    #[test]
    fn timestamp_late_in_utc_day_lands_in_next_local_month() {
        let west = clock().with_offset_hours(-1);
        let key = normalize_payment_month("2023-09-30T23:00:00.000Z", &west);
        assert_eq!(key.to_string(), "2023-10");
    }

    #[test]
    fn timestamp_for_local_midnight_east_of_greenwich() {
        // 2023-10-01 00:00 in UTC+2 is stored as the previous UTC day.
        let east = clock().with_offset_hours(2);
        let key = normalize_payment_month("2023-09-30T22:00:00.000Z", &east);
        assert_eq!(key.to_string(), "2023-10");
    }

    #[test]
    fn month_and_date_strings_are_literal() {
        let west = clock().with_offset_hours(-8);
        assert_eq!(normalize_payment_month("2023-10", &west).to_string(), "2023-10");
        assert_eq!(normalize_payment_month("2023-10-01", &west).to_string(), "2023-10");
        assert_eq!(
            normalize_payment_month("2023-10-15T08:30:00", &west).to_string(),
            "2023-10"
        );
    }

    #[test]
    fn unreadable_timestamp_degrades_to_current_month() {
        assert_eq!(normalize_payment_month("??", &clock()).to_string(), "2024-06");
    }
}
