#![doc(test(attr(deny(warnings))))]

//! Steward Core is the ledger aggregation, budgeting, and goal tracking
//! engine behind a stewardship finance tracker. It normalizes raw records
//! read from a category document store, derives totals and the tithe
//! suggestion, tracks budget lines and savings goals, and compiles the
//! consolidated report handed to external renderers.

pub mod domain;
pub mod engine;
pub mod errors;
pub mod normalize;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Steward Core tracing initialized.");
    });
}
