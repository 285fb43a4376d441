#![doc(test(attr(deny(warnings))))]

//! Shift Core provides the shift lifecycle, checklist gating, and
//! double-register cash ledger primitives that power club operations
//! workflows.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod money;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Shift Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
