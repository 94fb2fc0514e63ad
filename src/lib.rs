#![doc(test(attr(deny(warnings))))]

//! Budget Buddy tracks expenses against per-category budgets and raises one
//! alert per threshold crossing (80%, 85%, 100%), re-arming when spending
//! falls back below a threshold.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod notify;
pub mod storage;
pub mod utils;

pub use crate::core::{BudgetTracker, Clock, FixedClock, RefreshReport, SystemClock};
pub use errors::{BuddyError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Buddy tracing initialized.");
    });
}
