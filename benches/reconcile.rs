use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;

use cuotas_core::{FixedClock, LedgerReconciler, MemberStore, RosterFilter, RosterService};
use cuotas_domain::{DebtSource, MemberDraft, MonthKey, Payment, PaymentDraft, Roster};
use cuotas_storage_json::{load_roster_from_path, save_roster_to_path};

fn clock() -> FixedClock {
    FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap())
}

/// Ten years of monthly payments with mixed timestamp shapes.
fn sample_payments() -> Vec<Payment> {
    let mut month = MonthKey::new(2014, 7).unwrap();
    let mut payments = Vec::new();
    for idx in 0..120 {
        let timestamp = if idx % 2 == 0 {
            month.to_string()
        } else {
            format!("{}T03:00:00.000Z", month.first_day())
        };
        payments.push(Payment::new(idx + 1, 1, timestamp, "1500.00"));
        month = month.next();
    }
    payments
}

fn build_roster(members: usize) -> Roster {
    let mut roster = Roster::default();
    for idx in 0..members {
        let member = roster
            .insert_member(MemberDraft {
                full_name: format!("Socio {idx}"),
                start_date: "2020-01-15".into(),
                end_date: None,
            })
            .unwrap();
        let mut month = MonthKey::new(2020, 1).unwrap();
        for _ in 0..(idx % 48) {
            roster
                .insert_payment(PaymentDraft {
                    owner_id: member.id,
                    month,
                    amount: "1500.00".into(),
                })
                .unwrap();
            month = month.next();
        }
    }
    roster
}

fn bench_reconcile(c: &mut Criterion) {
    let payments = sample_payments();
    let clock = clock();
    c.bench_function("reconcile_ten_years", |b| {
        b.iter(|| {
            LedgerReconciler::reconcile(
                black_box(&payments),
                black_box("2014-07-01"),
                None,
                &clock,
            )
        })
    });
}

fn bench_roster(c: &mut Criterion) {
    let roster = build_roster(500);
    let clock = clock();
    c.bench_function("roster_entries_500_members", |b| {
        b.iter(|| {
            let entries = RosterService::entries(&roster, DebtSource::Backend, &clock).unwrap();
            RosterService::filter(entries, black_box(&RosterFilter::default()))
        })
    });
}

fn bench_persistence(c: &mut Criterion) {
    let roster = build_roster(500);
    c.bench_function("roster_save_load_500_members", |b| {
        b.iter_batched(
            || tempdir().unwrap(),
            |dir| {
                let path = dir.path().join("roster.json");
                save_roster_to_path(&roster, &path).unwrap();
                black_box(load_roster_from_path(&path).unwrap());
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_reconcile, bench_roster, bench_persistence);
criterion_main!(benches);
