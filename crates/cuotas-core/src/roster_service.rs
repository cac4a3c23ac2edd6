use std::collections::HashMap;

use cuotas_domain::{DebtSource, DebtStatus, Member, Payment};

use crate::{member_service::MemberOverview, storage::MemberStore, time::Clock, CoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" | "todos" => Some(StatusFilter::All),
            "active" | "activos" => Some(StatusFilter::Active),
            "inactive" | "baja" => Some(StatusFilter::Inactive),
            _ => None,
        }
    }

    fn matches(self, member: &Member) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => member.is_active(),
            StatusFilter::Inactive => !member.is_active(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebtFilter {
    #[default]
    All,
    Debt,
    Clean,
}

impl DebtFilter {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" | "todos" => Some(DebtFilter::All),
            "debt" | "deudores" => Some(DebtFilter::Debt),
            "clean" | "nodeudores" => Some(DebtFilter::Clean),
            _ => None,
        }
    }

    fn matches(self, status: DebtStatus) -> bool {
        match self {
            DebtFilter::All => true,
            DebtFilter::Debt => status.is_debt(),
            DebtFilter::Clean => !status.is_debt(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RosterFilter {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub debt: DebtFilter,
}

/// One row of the member list.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub member: Member,
    pub status: DebtStatus,
    pub overdue_month_count: u32,
}

impl From<MemberOverview> for RosterEntry {
    fn from(overview: MemberOverview) -> Self {
        let overdue_month_count = overview
            .member
            .summary
            .as_ref()
            .map(|summary| summary.overdue_month_count)
            .unwrap_or(overview.local_summary.overdue_month_count);
        Self {
            member: overview.member,
            status: overview.status,
            overdue_month_count,
        }
    }
}

pub struct RosterService;

impl RosterService {
    /// Classifies every member, loading all payments once.
    pub fn entries(
        store: &dyn MemberStore,
        source: DebtSource,
        clock: &dyn Clock,
    ) -> Result<Vec<RosterEntry>, CoreError> {
        let mut by_owner: HashMap<i64, Vec<Payment>> = HashMap::new();
        for payment in store.list_payments()? {
            by_owner.entry(payment.owner_id).or_default().push(payment);
        }
        let entries = store
            .list_members()?
            .into_iter()
            .map(|member| {
                let payments = by_owner.remove(&member.id).unwrap_or_default();
                RosterEntry::from(MemberOverview::build(member, payments, source, clock))
            })
            .collect();
        Ok(entries)
    }

    /// Applies search and filters, sorted by name ignoring case.
    pub fn filter(entries: Vec<RosterEntry>, filter: &RosterFilter) -> Vec<RosterEntry> {
        let needle = filter
            .search
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());
        let mut rows: Vec<RosterEntry> = entries
            .into_iter()
            .filter(|entry| {
                needle
                    .as_ref()
                    .map(|needle| entry.member.full_name.to_lowercase().contains(needle))
                    .unwrap_or(true)
            })
            .filter(|entry| filter.status.matches(&entry.member))
            .filter(|entry| filter.debt.matches(entry.status))
            .collect();
        rows.sort_by_key(|entry| entry.member.full_name.to_lowercase());
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str, active: bool, status: DebtStatus) -> RosterEntry {
        let mut member = Member::new(id, name, "2022-01-01");
        if !active {
            member.end_date = Some("2023-01-01".into());
        }
        RosterEntry {
            member,
            status,
            overdue_month_count: 0,
        }
    }

    fn sample() -> Vec<RosterEntry> {
        vec![
            entry(1, "juan Perez", true, DebtStatus::Debt),
            entry(2, "María López", true, DebtStatus::Current),
            entry(3, "Carlos Sánchez", false, DebtStatus::Debt),
        ]
    }

    fn names(rows: &[RosterEntry]) -> Vec<&str> {
        rows.iter().map(|row| row.member.full_name.as_str()).collect()
    }

    #[test]
    fn default_filter_sorts_case_insensitively() {
        let rows = RosterService::filter(sample(), &RosterFilter::default());
        assert_eq!(names(&rows), vec!["Carlos Sánchez", "juan Perez", "María López"]);
    }

    #[test]
    fn search_matches_substrings_ignoring_case() {
        let filter = RosterFilter {
            search: Some("  PEREZ ".into()),
            ..RosterFilter::default()
        };
        let rows = RosterService::filter(sample(), &filter);
        assert_eq!(names(&rows), vec!["juan Perez"]);
    }

    #[test]
    fn status_and_debt_filters_combine() {
        let filter = RosterFilter {
            search: None,
            status: StatusFilter::Active,
            debt: DebtFilter::Debt,
        };
        let rows = RosterService::filter(sample(), &filter);
        assert_eq!(names(&rows), vec!["juan Perez"]);

        let inactive = RosterFilter {
            status: StatusFilter::Inactive,
            ..RosterFilter::default()
        };
        assert_eq!(
            names(&RosterService::filter(sample(), &inactive)),
            vec!["Carlos Sánchez"]
        );
    }

    #[test]
    fn filters_parse_spanish_and_english_labels() {
        assert_eq!(StatusFilter::from_str("baja"), Some(StatusFilter::Inactive));
        assert_eq!(DebtFilter::from_str("Deudores"), Some(DebtFilter::Debt));
        assert_eq!(DebtFilter::from_str("clean"), Some(DebtFilter::Clean));
        assert_eq!(StatusFilter::from_str("?"), None);
    }
}
