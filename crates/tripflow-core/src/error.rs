use std::fmt;

use thiserror::Error;
use tripflow_domain::{GuestId, WizardStep};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Guest not part of this booking: {0}")]
    UnknownGuest(GuestId),
    #[error("{0}")]
    Gate(#[from] GateViolation),
    #[error("Commit failed: {0}")]
    Commit(#[source] GatewayError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Expired sessions surface as the single auth signal regardless of which call hit them.
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            CoreError::Gateway(GatewayError::SessionExpired)
                | CoreError::Commit(GatewayError::SessionExpired)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}

/// Failures reported by the backend collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Session expired")]
    SessionExpired,
    #[error("Rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Maps HTTP-style status codes onto the error taxonomy; 401/403 collapse into `SessionExpired`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => GatewayError::SessionExpired,
            _ => GatewayError::Rejected {
                status,
                message: message.into(),
            },
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, GatewayError::SessionExpired)
    }
}

/// A wizard transition that was blocked locally. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateViolation {
    StepOneNotApproved,
    GuestsUnresolved { pending: Vec<String> },
    StepNotReachable { from: WizardStep, to: WizardStep },
    UncommittedChanges,
    EditsClosed(WizardStep),
}

impl fmt::Display for GateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateViolation::StepOneNotApproved => {
                f.write_str("Approve the booking details before continuing")
            }
            GateViolation::GuestsUnresolved { pending } => write!(
                f,
                "Insurance is not confirmed for: {}",
                pending.join(", ")
            ),
            GateViolation::StepNotReachable { from, to } => {
                write!(f, "Cannot move from {} to {}", from, to)
            }
            GateViolation::UncommittedChanges => {
                f.write_str("Save the guest insurance changes before continuing")
            }
            GateViolation::EditsClosed(step) => {
                write!(f, "Guest insurance cannot be changed on {}", step)
            }
        }
    }
}
