use thiserror::Error;

use cuotas_domain::{Action, MonthKey, MonthKeyError, Role, WireError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Member not found: {0}")]
    MemberNotFound(i64),
    #[error("Payment not found: {0}")]
    PaymentNotFound(i64),
    #[error("A payment for member {member_id} already exists for {month}")]
    DuplicatePayment { member_id: i64, month: MonthKey },
    #[error("Permission denied: role {role} cannot {action}")]
    PermissionDenied { role: Role, action: Action },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<WireError> for CoreError {
    fn from(err: WireError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

impl From<MonthKeyError> for CoreError {
    fn from(err: MonthKeyError) -> Self {
        CoreError::Validation(err.to_string())
    }
}
