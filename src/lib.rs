#![doc(test(attr(deny(warnings))))]

//! tripflow orchestrates the post-booking lifecycle of a tour reservation: status
//! normalization, the resumable three-step review wizard, staged guest insurance
//! edits, leave-confirmation and amount-due reconciliation.

pub mod errors;
pub mod session;
pub mod utils;

pub use tripflow_config;
pub use tripflow_core;
pub use tripflow_domain;
pub use tripflow_storage_json;

pub use errors::{FlowError, Result};
pub use session::{BookingSession, SessionSettings};

use std::sync::Once;

use tripflow_config::Config;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter and emits a startup info log.
pub fn init() {
    init_with_filter(utils::DEFAULT_LOG_DIRECTIVE);
}

/// Initializes global tracing with the filter resolved from `config`.
pub fn init_with_config(config: &Config) {
    init_with_filter(&config.resolve_log_filter());
}

fn init_with_filter(directives: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directives);
        tracing::info!("tripflow tracing initialized.");
    });
}
