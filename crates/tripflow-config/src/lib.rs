//! tripflow-config
//!
//! Booking-flow settings: where wizard progress lives, how navigation is guarded
//! and how logging is filtered. Owns the Config data structure plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, LogLevel};
