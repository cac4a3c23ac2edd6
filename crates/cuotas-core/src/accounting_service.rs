use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::warn;

use cuotas_domain::{MonthKey, Payment, MONTHS_PER_YEAR};

use crate::{calendar::normalize_payment_month, time::Clock};

/// Collected fees for one calendar year, bucketed by payment month.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountingSummary {
    pub year: i32,
    pub total: Decimal,
    /// Index 0 is January.
    pub monthly: Vec<Decimal>,
    pub payment_count: usize,
}

impl AccountingSummary {
    fn empty(year: i32) -> Self {
        Self {
            year,
            total: Decimal::ZERO,
            monthly: vec![Decimal::ZERO; MONTHS_PER_YEAR],
            payment_count: 0,
        }
    }
}

pub struct AccountingService;

impl AccountingService {
    /// Sums every payment whose month falls in `year`. Amounts that do not
    /// parse as decimals are left out.
    pub fn year_summary(payments: &[Payment], year: i32, clock: &dyn Clock) -> AccountingSummary {
        let mut summary = AccountingSummary::empty(year);
        for payment in payments {
            let month = normalize_payment_month(&payment.timestamp, clock);
            if month.year() != year {
                continue;
            }
            let Some(amount) = Self::amount_of(payment) else {
                continue;
            };
            summary.monthly[month.index0()] += amount;
            summary.total += amount;
            summary.payment_count += 1;
        }
        summary
    }

    pub fn month_total(payments: &[Payment], month: MonthKey, clock: &dyn Clock) -> Decimal {
        payments
            .iter()
            .filter(|payment| normalize_payment_month(&payment.timestamp, clock) == month)
            .filter_map(Self::amount_of)
            .sum()
    }

    fn amount_of(payment: &Payment) -> Option<Decimal> {
        match Decimal::from_str(payment.amount.trim()) {
            Ok(amount) => Some(amount),
            Err(_) => {
                warn!(payment = payment.id, amount = %payment.amount, "skipping unparsable amount");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::time::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn payments() -> Vec<Payment> {
        vec![
            Payment::new(1, 1, "2024-01", "15.00"),
            Payment::new(2, 2, "2024-01-10", "20.50"),
            Payment::new(3, 1, "2024-03", "15.00"),
            Payment::new(4, 1, "2023-12", "15.00"),
            Payment::new(5, 3, "2024-03", "n/a"),
        ]
    }

    #[test]
    fn year_summary_buckets_by_month() {
        let summary = AccountingService::year_summary(&payments(), 2024, &clock());
        assert_eq!(summary.total, Decimal::from_str("50.50").unwrap());
        assert_eq!(summary.monthly[0], Decimal::from_str("35.50").unwrap());
        assert_eq!(summary.monthly[2], Decimal::from_str("15.00").unwrap());
        assert_eq!(summary.monthly[1], Decimal::ZERO);
        assert_eq!(summary.payment_count, 3);
    }

    #[test]
    fn empty_year_has_twelve_zero_buckets() {
        let summary = AccountingService::year_summary(&payments(), 2020, &clock());
        assert_eq!(summary.monthly.len(), 12);
        assert_eq!(summary.total, Decimal::ZERO);
        assert_eq!(summary.payment_count, 0);
    }

    #[test]
    fn month_total_sums_one_month() {
        let month = MonthKey::new(2023, 12).unwrap();
        let total = AccountingService::month_total(&payments(), month, &clock());
        assert_eq!(total, Decimal::from_str("15").unwrap());
    }
}
