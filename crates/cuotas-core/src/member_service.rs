use chrono::NaiveDate;

use cuotas_domain::{
    DebtSource, DebtStatus, DebtSummary, Member, MemberDraft, MonthKey, Payment, ReconciledLedger,
};

use crate::{
    calendar::try_parse_calendar_date, debt::DebtClassifier, reconcile::LedgerReconciler,
    storage::MemberStore, time::Clock, CoreError,
};

/// Everything a member detail screen shows.
#[derive(Debug, Clone)]
pub struct MemberOverview {
    pub member: Member,
    pub payments: Vec<Payment>,
    pub ledger: ReconciledLedger,
    /// Aggregates recomputed from `ledger`.
    pub local_summary: DebtSummary,
    pub status: DebtStatus,
}

impl MemberOverview {
    /// Builds the overview from already-loaded data.
    pub fn build(
        member: Member,
        payments: Vec<Payment>,
        source: DebtSource,
        clock: &dyn Clock,
    ) -> Self {
        let today = clock.today();
        let ledger = LedgerReconciler::reconcile(
            &payments,
            &member.start_date,
            member.end_date.as_deref(),
            clock,
        );
        let local_summary = LedgerReconciler::summarize(&ledger, today);
        let status = DebtClassifier::classify(source, member.summary.as_ref(), &ledger, today);
        Self {
            member,
            payments,
            ledger,
            local_summary,
            status,
        }
    }

    /// Overdue months from the chosen source of truth.
    pub fn overdue_months(&self, source: DebtSource) -> Vec<MonthKey> {
        match (source, self.member.summary.as_ref()) {
            (DebtSource::Backend, Some(summary)) if !summary.overdue_months.is_empty() => {
                summary.overdue_months.clone()
            }
            _ => self.local_summary.overdue_months.clone(),
        }
    }
}

pub struct MemberService;

impl MemberService {
    pub fn add(
        store: &mut dyn MemberStore,
        draft: MemberDraft,
        clock: &dyn Clock,
    ) -> Result<Member, CoreError> {
        let draft = Self::validate_draft(draft, clock)?;
        store.insert_member(draft)
    }

    /// Records the membership end date ("baja").
    pub fn deactivate(
        store: &mut dyn MemberStore,
        id: i64,
        end_date: &str,
        clock: &dyn Clock,
    ) -> Result<Member, CoreError> {
        let mut member = store.member(id)?;
        let start = Self::require_date("start date", &member.start_date, clock)?;
        let end = Self::require_date("end date", end_date, clock)?;
        if end < start {
            return Err(CoreError::Validation(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        member.end_date = Some(end.format("%Y-%m-%d").to_string());
        store.update_member(member.clone())?;
        Ok(member)
    }

    /// Clears the end date so the member is active again.
    pub fn reactivate(store: &mut dyn MemberStore, id: i64) -> Result<Member, CoreError> {
        let mut member = store.member(id)?;
        member.end_date = None;
        store.update_member(member.clone())?;
        Ok(member)
    }

    pub fn remove(store: &mut dyn MemberStore, id: i64) -> Result<Member, CoreError> {
        store.delete_member(id)
    }

    pub fn overview(
        store: &dyn MemberStore,
        id: i64,
        source: DebtSource,
        clock: &dyn Clock,
    ) -> Result<MemberOverview, CoreError> {
        let member = store.member(id)?;
        let payments = store.payments_for(id)?;
        Ok(MemberOverview::build(member, payments, source, clock))
    }

    fn validate_draft(draft: MemberDraft, clock: &dyn Clock) -> Result<MemberDraft, CoreError> {
        let full_name = draft.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(CoreError::Validation("member name is required".into()));
        }
        let start = Self::require_date("start date", &draft.start_date, clock)?;
        let end_date = match draft
            .end_date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            Some(raw) => {
                let end = Self::require_date("end date", raw, clock)?;
                if end < start {
                    return Err(CoreError::Validation(format!(
                        "end date {} is before start date {}",
                        end, start
                    )));
                }
                Some(end.format("%Y-%m-%d").to_string())
            }
            None => None,
        };
        Ok(MemberDraft {
            full_name,
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date,
        })
    }

    fn require_date(
        label: &str,
        raw: &str,
        clock: &dyn Clock,
    ) -> Result<NaiveDate, CoreError> {
        try_parse_calendar_date(raw, clock)
            .ok_or_else(|| CoreError::Validation(format!("{} `{}` is not a date", label, raw)))
    }
}
