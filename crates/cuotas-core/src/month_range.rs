use chrono::NaiveDate;

use cuotas_domain::{months_between, MonthKey};

use crate::{calendar::parse_calendar_date, time::Clock};

/// Expands a membership window into the months dues are expected for.
pub struct MonthRangeGenerator;

impl MonthRangeGenerator {
    /// Months from the start date's month through the end date's month,
    /// inclusive. A missing or blank end date means "today" per `clock`.
    ///
    /// Both bounds are aligned to the first of their month before comparing,
    /// so the days inside the months never matter. An inverted window yields
    /// an empty list.
    pub fn generate(start: &str, end: Option<&str>, clock: &dyn Clock) -> Vec<MonthKey> {
        let start_date = parse_calendar_date(start, clock);
        let end_date = match end.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => parse_calendar_date(raw, clock),
            None => clock.today(),
        };
        Self::between_dates(start_date, end_date)
    }

    pub fn between_dates(start: NaiveDate, end: NaiveDate) -> Vec<MonthKey> {
        months_between(MonthKey::from_date(start), MonthKey::from_date(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn labels(months: &[MonthKey]) -> Vec<String> {
        months.iter().map(ToString::to_string).collect()
    }

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap())
    }

    #[test]
    fn same_month_yields_one_entry_regardless_of_day_order() {
        let months = MonthRangeGenerator::generate("2024-03-15", Some("2024-03-01"), &clock());
        assert_eq!(labels(&months), vec!["2024-03"]);
    }

    #[test]
    fn open_window_runs_through_current_month() {
        let months = MonthRangeGenerator::generate("2024-01-10", None, &clock());
        assert_eq!(
            labels(&months),
            vec!["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"]
        );
        let blank = MonthRangeGenerator::generate("2024-01-10", Some("  "), &clock());
        assert_eq!(blank, months);
    }

    #[test]
    fn inverted_window_is_empty() {
        let months = MonthRangeGenerator::generate("2024-05-01", Some("2024-04-30"), &clock());
        assert!(months.is_empty());
    }

    #[test]
    fn length_matches_inclusive_month_count() {
        let cases = [
            ("2020-09-15", "2023-03-01", 31),
            ("2023-12-31", "2024-01-01", 2),
            ("2019-01-01", "2019-12-31", 12),
            ("2022-02-28", "2024-02-29", 25),
        ];
        for (start, end, expected) in cases {
            let months = MonthRangeGenerator::generate(start, Some(end), &clock());
            assert_eq!(months.len(), expected, "{start}..{end}");
            assert!(months.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn start_with_utc_timestamp_keeps_literal_day_west_of_greenwich() {
        let west = clock().with_offset_hours(-3);
        let months = MonthRangeGenerator::generate(
            "2023-11-01T00:00:00.000Z",
            Some("2023-12-01T00:00:00.000Z"),
            &west,
        );
        assert_eq!(labels(&months), vec!["2023-11", "2023-12"]);
    }
}
