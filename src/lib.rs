#![doc(test(attr(deny(warnings))))]

//! Cuotas keeps the membership dues ledger of a small association: who is a
//! member, which months they paid and whether they are up to date.
//!
//! The algorithms live in `cuotas-core`; this crate wires them to the
//! interactive shell, the JSON store and the optional C ABI.

pub mod cli;
pub mod errors;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Cuotas tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
