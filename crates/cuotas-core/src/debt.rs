use chrono::{Datelike, NaiveDate};

use cuotas_domain::{DebtSource, DebtStatus, DebtSummary, ReconciledLedger};

use crate::reconcile::LedgerReconciler;

pub struct DebtClassifier;

impl DebtClassifier {
    /// Classifies from a full payment grid.
    ///
    /// Past years must be fully paid. In the current year only months up to
    /// and including the current one are checked. Later years are ignored.
    pub fn from_ledger(ledger: &ReconciledLedger, today: NaiveDate) -> DebtStatus {
        let current_year = today.year();
        let current_month = today.month0() as usize;

        for entry in &ledger.years {
            let checked = if entry.year < current_year {
                entry.months.len()
            } else if entry.year == current_year {
                current_month + 1
            } else {
                continue;
            };
            if entry.months.iter().take(checked).any(|slot| !slot.paid) {
                return DebtStatus::Debt;
            }
        }
        DebtStatus::Current
    }

    /// Classifies from backend-computed counters.
    pub fn from_summary(summary: &DebtSummary) -> DebtStatus {
        if summary.all_paid {
            DebtStatus::Current
        } else if summary.overdue_month_count > 0 {
            DebtStatus::Debt
        } else {
            DebtStatus::Current
        }
    }

    /// Picks the single source of truth for one member.
    ///
    /// `Backend` trusts the server aggregates and, when a member has none,
    /// recomputes the same aggregates from the due months of the ledger.
    /// `Ledger` applies the full-grid rule of `from_ledger`.
    pub fn classify(
        source: DebtSource,
        summary: Option<&DebtSummary>,
        ledger: &ReconciledLedger,
        today: NaiveDate,
    ) -> DebtStatus {
        match (source, summary) {
            (DebtSource::Backend, Some(summary)) => Self::from_summary(summary),
            (DebtSource::Backend, None) => {
                Self::from_summary(&LedgerReconciler::summarize(ledger, today))
            }
            (DebtSource::Ledger, _) => Self::from_ledger(ledger, today),
        }
    }
}
