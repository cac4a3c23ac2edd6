//! Stable, public-facing helpers that wrap the internal service layer.
//!
//! Frontends (CLI, FFI) call these instead of wiring the reconciler, the
//! classifier and the month generator together themselves.

use serde::Serialize;

use cuotas_domain::{
    DebtSource, DebtStatus, DebtSummary, MemberRecord, MonthKey, Payment, ReconciledLedger,
};

use crate::{
    debt::DebtClassifier, member_service::MemberOverview, month_range::MonthRangeGenerator,
    reconcile::LedgerReconciler, time::Clock,
};

/// Classification of one member plus the grid it was derived from.
#[derive(Debug, Clone, Serialize)]
pub struct ApiMemberStatus {
    pub member_id: i64,
    pub status: DebtStatus,
    pub summary: DebtSummary,
    pub ledger: ReconciledLedger,
}

/// Expected dues months between two raw dates; a missing end means today.
pub fn api_generate_months_range(
    start: &str,
    end: Option<&str>,
    clock: &dyn Clock,
) -> Vec<MonthKey> {
    MonthRangeGenerator::generate(start, end, clock)
}

/// Reconciles raw payments against a membership window.
pub fn api_parse_payments_to_ledger(
    payments: &[Payment],
    start: &str,
    end: Option<&str>,
    clock: &dyn Clock,
) -> ReconciledLedger {
    LedgerReconciler::reconcile(payments, start, end, clock)
}

/// DEBT when any due month up to the current one is unpaid.
pub fn api_classify_ledger(ledger: &ReconciledLedger, clock: &dyn Clock) -> DebtStatus {
    DebtClassifier::from_ledger(ledger, clock.today())
}

/// DEBT when the backend says not all months are paid and at least one is overdue.
pub fn api_classify_summary(summary: &DebtSummary) -> DebtStatus {
    DebtClassifier::from_summary(summary)
}

/// Full status for a member decoded from the backend.
pub fn api_member_status(
    record: MemberRecord,
    source: DebtSource,
    clock: &dyn Clock,
) -> ApiMemberStatus {
    let overview = MemberOverview::build(record.member, record.payments, source, clock);
    let summary = match (source, overview.member.summary.clone()) {
        (DebtSource::Backend, Some(summary)) => summary,
        _ => overview.local_summary.clone(),
    };
    ApiMemberStatus {
        member_id: overview.member.id,
        status: overview.status,
        summary,
        ledger: overview.ledger,
    }
}
