use serde::{Deserialize, Serialize};

use crate::month::MonthKey;

/// A dues payment as stored by the backend. Immutable once fetched.
///
/// `timestamp` is kept verbatim; only its calendar month carries meaning and
/// it is normalized by the reconciler, never by slicing the string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub owner_id: i64,
    pub timestamp: String,
    /// Decimal amount kept as text to avoid float rounding.
    pub amount: String,
}

impl Payment {
    pub fn new(
        id: i64,
        owner_id: i64,
        timestamp: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            id,
            owner_id,
            timestamp: timestamp.into(),
            amount: amount.into(),
        }
    }
}

/// Input for recording a new payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub owner_id: i64,
    pub month: MonthKey,
    pub amount: String,
}
