//! Merges expected dues months with the payments actually recorded.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::debug;

use cuotas_domain::{DebtSummary, MonthKey, Payment, ReconciledLedger, YearLedger};

use crate::{calendar::normalize_payment_month, month_range::MonthRangeGenerator, time::Clock};

pub struct LedgerReconciler;

impl LedgerReconciler {
    /// Builds the dense per-year payment grid for one member.
    ///
    /// Pure function of its inputs: calling it twice yields equal ledgers.
    pub fn reconcile(
        payments: &[Payment],
        start: &str,
        end: Option<&str>,
        clock: &dyn Clock,
    ) -> ReconciledLedger {
        let expected = MonthRangeGenerator::generate(start, end, clock);
        Self::reconcile_months(payments, &expected, clock)
    }

    /// Grid over an explicit list of expected months.
    ///
    /// When two payments normalize to the same month the later one in
    /// `payments` wins.
    pub fn reconcile_months(
        payments: &[Payment],
        expected: &[MonthKey],
        clock: &dyn Clock,
    ) -> ReconciledLedger {
        if expected.is_empty() {
            debug!(payments = payments.len(), "empty membership window");
            return ReconciledLedger::default();
        }

        let mut paid: HashMap<MonthKey, &Payment> = HashMap::with_capacity(payments.len());
        for payment in payments {
            let key = normalize_payment_month(&payment.timestamp, clock);
            if let Some(previous) = paid.insert(key, payment) {
                debug!(
                    month = %key,
                    replaced = previous.id,
                    kept = payment.id,
                    "duplicate payment for month"
                );
            }
        }

        let mut years: BTreeMap<i32, YearLedger> = BTreeMap::new();
        for month in expected {
            let entry = years
                .entry(month.year())
                .or_insert_with(|| YearLedger::new(month.year()));
            let slot = &mut entry.months[month.index0()];
            slot.due = true;
            if let Some(payment) = paid.get(month) {
                slot.paid = true;
                slot.amount = Some(payment.amount.clone());
                slot.payment_id = Some(payment.id);
            }
        }

        let ledger = ReconciledLedger {
            years: years.into_values().collect(),
        };
        debug!(
            expected = expected.len(),
            payments = payments.len(),
            years = ledger.years.len(),
            "reconciled payment grid"
        );
        ledger
    }

    /// Aggregates equivalent to the backend's debt counters, computed from a
    /// local ledger. Only months inside the membership window and not after
    /// the current month count as owed.
    pub fn summarize(ledger: &ReconciledLedger, today: NaiveDate) -> DebtSummary {
        let current = MonthKey::from_date(today);
        let mut summary = DebtSummary::default();
        for (month, slot) in ledger.iter_slots().filter(|(_, slot)| slot.due) {
            if slot.paid {
                summary.payments_made += 1;
            }
            if month > current {
                continue;
            }
            summary.total_months += 1;
            if !slot.paid {
                summary.overdue_months.push(month);
            }
        }
        summary.overdue_month_count = summary.overdue_months.len() as u32;
        summary.all_paid = summary.overdue_months.is_empty();
        summary
    }
}
