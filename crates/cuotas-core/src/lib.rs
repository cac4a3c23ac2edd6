//! cuotas-core
//!
//! Dues reconciliation and member services.
//! Depends on cuotas-domain. No CLI, no terminal I/O; storage is reached only
//! through the `MemberStore` trait.

pub mod access;
pub mod accounting_service;
pub mod calendar;
pub mod debt;
pub mod error;
pub mod member_service;
pub mod month_range;
pub mod payment_service;
pub mod public_api;
pub mod reconcile;
pub mod roster_service;
pub mod storage;
pub mod time;

pub use access::authorize;
pub use accounting_service::*;
pub use calendar::{normalize_payment_month, parse_calendar_date, try_parse_calendar_date};
pub use debt::DebtClassifier;
pub use error::CoreError;
pub use member_service::*;
pub use month_range::MonthRangeGenerator;
pub use payment_service::PaymentService;
pub use public_api::*;
pub use reconcile::LedgerReconciler;
pub use roster_service::*;
pub use storage::MemberStore;
pub use time::{Clock, FixedClock, OffsetClock};
