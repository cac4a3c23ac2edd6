//! Calendar month keys, the atomic unit of the dues ledger.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A (year, month) pair serialized as `YYYY-MM`.
///
/// Field order matters: the derived ordering compares `year` first, then
/// `month`, which is the numeric order of calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Builds a key, returning `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number in `1..=12`.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Zero-based month index, the slot position inside a year ledger.
    pub fn index0(&self) -> usize {
        (self.month - 1) as usize
    }

    pub fn first_day(&self) -> NaiveDate {
        // Month is validated on construction and day 1 always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of months from `self` to `other`, negative when `other` is earlier.
    pub fn months_until(&self, other: MonthKey) -> i64 {
        let from = self.year as i64 * 12 + self.month as i64 - 1;
        let to = other.year as i64 * 12 + other.month as i64 - 1;
        to - from
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Reasons a `YYYY-MM` string is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthKeyError {
    Format(String),
    MonthOutOfRange(u32),
}

impl fmt::Display for MonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthKeyError::Format(raw) => {
                write!(f, "`{}` is not a month in YYYY-MM format", raw)
            }
            MonthKeyError::MonthOutOfRange(month) => {
                write!(f, "month {} is outside 01-12", month)
            }
        }
    }
}

impl std::error::Error for MonthKeyError {}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    /// Strict parse: exactly four digits, a dash, two digits.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let bytes = raw.as_bytes();
        let shape_ok = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !shape_ok {
            return Err(MonthKeyError::Format(raw.to_string()));
        }
        let year: i32 = raw[..4]
            .parse()
            .map_err(|_| MonthKeyError::Format(raw.to_string()))?;
        let month: u32 = raw[5..]
            .parse()
            .map_err(|_| MonthKeyError::Format(raw.to_string()))?;
        MonthKey::new(year, month).ok_or(MonthKeyError::MonthOutOfRange(month))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

/// Inclusive list of months from `start` to `end`; empty when `start > end`.
pub fn months_between(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
    let span = start.months_until(end);
    if span < 0 {
        return Vec::new();
    }
    let mut months = Vec::with_capacity(span as usize + 1);
    let mut current = start;
    while current <= end {
        months.push(current);
        current = current.next();
    }
    months
}
