use std::fmt;

use serde::{Deserialize, Serialize};

use crate::month::MonthKey;

/// An association member ("integrante").
///
/// Membership dates are kept as the day-precision strings received from the
/// backend; parsing happens in the core where the local calendar is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Aggregates computed by the backend, when the member came from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<DebtSummary>,
}

impl Member {
    pub fn new(id: i64, full_name: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            start_date: start_date.into(),
            end_date: None,
            summary: None,
        }
    }

    /// A member is active until an end date ("baja") is recorded.
    pub fn is_active(&self) -> bool {
        self.end_date
            .as_deref()
            .map(|value| value.trim().is_empty())
            .unwrap_or(true)
    }
}

/// Input for registering a new member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub full_name: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Debt aggregates for one member.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebtSummary {
    pub all_paid: bool,
    pub overdue_month_count: u32,
    #[serde(default)]
    pub overdue_months: Vec<MonthKey>,
    #[serde(default)]
    pub total_months: u32,
    #[serde(default)]
    pub payments_made: u32,
}

/// Binary debt classification shown as a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtStatus {
    Debt,
    Current,
}

impl DebtStatus {
    pub fn is_debt(self) -> bool {
        matches!(self, DebtStatus::Debt)
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DebtStatus::Debt => "DEBT",
            DebtStatus::Current => "CURRENT",
        };
        f.write_str(label)
    }
}

/// Which data the debt status is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtSource {
    /// Trust backend aggregates; fall back to the ledger when they are absent.
    #[default]
    Backend,
    /// Always recompute from the reconciled ledger.
    Ledger,
}

impl DebtSource {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "backend" => Some(DebtSource::Backend),
            "ledger" => Some(DebtSource::Ledger),
            _ => None,
        }
    }
}

impl fmt::Display for DebtSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DebtSource::Backend => "backend",
            DebtSource::Ledger => "ledger",
        };
        f.write_str(label)
    }
}
