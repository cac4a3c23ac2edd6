use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

use cuotas_domain::MonthKey;

/// Clock abstracts access to the current instant and the user's time zone so
/// calendar computations remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Converts an instant into wall-clock time of the user's zone.
    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime;

    /// Returns the current local date. Defaults to `to_local(now()).date()`.
    fn today(&self) -> NaiveDate {
        self.to_local(self.now()).date()
    }

    fn current_month(&self) -> MonthKey {
        MonthKey::from_date(self.today())
    }
}

/// Real-time clock pinned to a fixed UTC offset instead of the host zone.
#[derive(Debug, Clone, Copy)]
pub struct OffsetClock {
    offset: FixedOffset,
}

impl OffsetClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Offset east of UTC in minutes; `None` when out of range (±24h).
    pub fn from_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }
}

impl Clock for OffsetClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }
}

/// Clock frozen at a given instant, used by tests and reproducible reports.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Noon of `date` in UTC.
    pub fn on(date: NaiveDate) -> Self {
        Self::at_local_noon(date, Utc.fix())
    }

    /// Noon of `date` as seen from `offset`, observed from that zone.
    pub fn at_local_noon(date: NaiveDate, offset: FixedOffset) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .unwrap_or_else(|| date.and_time(NaiveTime::default()));
        let now = offset
            .from_local_datetime(&noon)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&noon));
        Self::new(now, offset)
    }

    /// Same instant, observed from a zone `hours` east of UTC.
    pub fn with_offset_hours(self, hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap_or(self.offset);
        Self { offset, ..self }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_local_date_for_its_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let clock = FixedClock::on(date);
        assert_eq!(clock.today(), date);
        // Noon UTC is already the next day fourteen hours east.
        assert_eq!(
            clock.with_offset_hours(14).today(),
            NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
        );
        assert_eq!(clock.current_month().to_string(), "2024-06");
    }

    #[test]
    fn pinned_local_noon_keeps_date_and_offset() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let clock = FixedClock::at_local_noon(date, offset);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().to_rfc3339(), "2024-07-01T15:00:00+00:00");
        let instant = DateTime::parse_from_rfc3339("2024-07-01T01:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            clock.to_local(instant).date(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
        );
    }

    #[test]
    fn offset_clock_rejects_impossible_offsets() {
        assert!(OffsetClock::from_minutes(-60).is_some());
        assert!(OffsetClock::from_minutes(25 * 60).is_none());
    }
}
