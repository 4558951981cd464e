use std::result::Result as StdResult;

use thiserror::Error;
use tripflow_config::ConfigError;
use tripflow_core::{CoreError, GateViolation, GatewayError};
use tripflow_domain::{BookingState, GuestId};

/// Unified error type for the booking session and its lower layers.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("No booking is open")]
    NoActiveBooking,
    #[error("Session expired")]
    SessionExpired,
    #[error("{0}")]
    Blocked(GateViolation),
    #[error("Could not save guest changes: {0}")]
    CommitFailed(GatewayError),
    #[error("Request failed: {0}")]
    Gateway(GatewayError),
    #[error("Not allowed while the booking is {0}")]
    InvalidState(BookingState),
    #[error("Guest not part of this booking: {0}")]
    UnknownGuest(GuestId),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, FlowError>;

impl FlowError {
    /// Blocked transitions and failed commits leave the session usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FlowError::Blocked(_) | FlowError::CommitFailed(_) | FlowError::UnknownGuest(_)
        )
    }
}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::StorageError(err.to_string())
    }
}

impl From<GatewayError> for FlowError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::SessionExpired => FlowError::SessionExpired,
            other => FlowError::Gateway(other),
        }
    }
}

impl From<CoreError> for FlowError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownGuest(id) => FlowError::UnknownGuest(id),
            CoreError::Gate(violation) => FlowError::Blocked(violation),
            CoreError::Commit(GatewayError::SessionExpired)
            | CoreError::Gateway(GatewayError::SessionExpired) => FlowError::SessionExpired,
            CoreError::Commit(err) => FlowError::CommitFailed(err),
            CoreError::Gateway(err) => FlowError::Gateway(err),
            CoreError::Serde(message) => FlowError::StorageError(message),
            CoreError::Io(err) => FlowError::StorageError(err.to_string()),
        }
    }
}

impl From<ConfigError> for FlowError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => FlowError::StorageError(io.to_string()),
            ConfigError::Serde(message) => FlowError::ConfigError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_collapse_into_session_expired() {
        assert!(matches!(
            FlowError::from(GatewayError::from_status(401, "unauthorized")),
            FlowError::SessionExpired
        ));
        assert!(matches!(
            FlowError::from(CoreError::Commit(GatewayError::SessionExpired)),
            FlowError::SessionExpired
        ));
    }

    #[test]
    fn commit_failures_stay_recoverable() {
        let err = FlowError::from(CoreError::Commit(GatewayError::Transport("reset".into())));
        assert!(matches!(err, FlowError::CommitFailed(_)));
        assert!(err.is_recoverable());
        assert!(!FlowError::SessionExpired.is_recoverable());
    }

    #[test]
    fn gate_messages_are_user_facing() {
        let err = FlowError::from(CoreError::Gate(GateViolation::GuestsUnresolved {
            pending: vec!["Ana".into(), "Ben".into()],
        }));
        assert_eq!(err.to_string(), "Insurance is not confirmed for: Ana, Ben");
    }
}
