//! cuotas-domain
//!
//! Pure domain models (MonthKey, Payment, Member, payment grids, roster snapshot).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod ledger;
pub mod member;
pub mod month;
pub mod payment;
pub mod role;
pub mod roster;
pub mod wire;

pub use ledger::*;
pub use member::*;
pub use month::*;
pub use payment::*;
pub use role::*;
pub use roster::*;
pub use wire::*;

// Re-export common dependencies so consumers can rely on this crate as a façade.
pub use chrono;
pub use rust_decimal;
pub use serde;
