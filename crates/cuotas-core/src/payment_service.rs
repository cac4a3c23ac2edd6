use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{info, warn};

use cuotas_domain::{DebtSource, MonthKey, Payment, PaymentDraft};

use crate::{
    calendar::normalize_payment_month, member_service::MemberService, storage::MemberStore,
    time::Clock, CoreError,
};

const AMOUNT_SCALE: u32 = 2;

pub struct PaymentService;

impl PaymentService {
    /// Strict `YYYY-MM` with month 01-12.
    pub fn parse_month(raw: &str) -> Result<MonthKey, CoreError> {
        Ok(MonthKey::from_str(raw.trim())?)
    }

    /// Positive decimal amount, normalized to two decimals. A decimal comma
    /// (`12,50`) is accepted.
    pub fn parse_amount(raw: &str) -> Result<String, CoreError> {
        let cleaned = raw.trim().replace(',', ".");
        let mut amount = Decimal::from_str(&cleaned)
            .map_err(|_| CoreError::Validation(format!("`{}` is not a valid amount", raw)))?;
        if amount <= Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "amount must be positive, got {}",
                raw
            )));
        }
        amount = amount.round_dp(AMOUNT_SCALE);
        amount.rescale(AMOUNT_SCALE);
        Ok(amount.to_string())
    }

    /// Records one payment, rejecting a second payment for the same month.
    pub fn record(
        store: &mut dyn MemberStore,
        draft: PaymentDraft,
        clock: &dyn Clock,
    ) -> Result<Payment, CoreError> {
        store.member(draft.owner_id)?;
        let amount = Self::parse_amount(&draft.amount)?;
        let existing = store.payments_for(draft.owner_id)?;
        if existing
            .iter()
            .any(|payment| normalize_payment_month(&payment.timestamp, clock) == draft.month)
        {
            return Err(CoreError::DuplicatePayment {
                member_id: draft.owner_id,
                month: draft.month,
            });
        }
        store.insert_payment(PaymentDraft { amount, ..draft })
    }

    pub fn remove(store: &mut dyn MemberStore, payment_id: i64) -> Result<Payment, CoreError> {
        store.delete_payment(payment_id)
    }

    /// Pays every overdue month of a member with the same amount.
    ///
    /// Months that turn out to be paid already are skipped.
    pub fn settle_overdue(
        store: &mut dyn MemberStore,
        member_id: i64,
        amount: &str,
        source: DebtSource,
        clock: &dyn Clock,
    ) -> Result<Vec<Payment>, CoreError> {
        let amount = Self::parse_amount(amount)?;
        let overview = MemberService::overview(&*store, member_id, source, clock)?;
        let months = overview.overdue_months(source);
        let mut recorded = Vec::with_capacity(months.len());
        for month in months {
            let draft = PaymentDraft {
                owner_id: member_id,
                month,
                amount: amount.clone(),
            };
            match Self::record(store, draft, clock) {
                Ok(payment) => recorded.push(payment),
                Err(CoreError::DuplicatePayment { month, .. }) => {
                    warn!(member = member_id, month = %month, "month already paid, skipping");
                }
                Err(err) => return Err(err),
            }
        }
        info!(member = member_id, payments = recorded.len(), "overdue months settled");
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_normalizes_scale() {
        assert_eq!(PaymentService::parse_amount("15").unwrap(), "15.00");
        assert_eq!(PaymentService::parse_amount(" 12,5 ").unwrap(), "12.50");
        assert_eq!(PaymentService::parse_amount("9.999").unwrap(), "10.00");
        assert!(PaymentService::parse_amount("0").is_err());
        assert!(PaymentService::parse_amount("-3").is_err());
        assert!(PaymentService::parse_amount("quince").is_err());
    }

    #[test]
    fn parse_month_is_strict() {
        assert!(PaymentService::parse_month("2024-02").is_ok());
        assert!(PaymentService::parse_month("2024-2").is_err());
        assert!(PaymentService::parse_month("2024-13").is_err());
    }
}
