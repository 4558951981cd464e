//! tripflow-core
//!
//! Booking-flow logic: status normalization, wizard state machine, staged guest edits,
//! leave-confirmation and pricing policy.
//! Depends on tripflow-domain. No network, no terminal I/O, no direct file access.

pub mod completion;
pub mod error;
pub mod events;
pub mod gateway;
pub mod navigation;
pub mod pricing;
pub mod progress;
pub mod session;
pub mod staged_edits;
pub mod status_normalizer;
pub mod time;
pub mod wizard_controller;

pub use completion::*;
pub use error::{CoreError, GateViolation, GatewayError};
pub use events::EventBus;
pub use gateway::BookingGateway;
pub use navigation::*;
pub use pricing::*;
pub use progress::*;
pub use session::*;
pub use staged_edits::*;
pub use status_normalizer::StatusNormalizer;
pub use time::*;
pub use wizard_controller::*;
