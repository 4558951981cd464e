//! Typed notifications exchanged between booking-flow components.

use serde::{Deserialize, Serialize};

use crate::{
    common::{BookingId, Money},
    guest::GuestRecord,
    status::BookingState,
    wizard::WizardStep,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BookingEvent {
    /// Committed guest list, to be adopted as the new baseline upstream.
    GuestsUpdated {
        booking_id: BookingId,
        guests: Vec<GuestRecord>,
    },
    StepChanged {
        booking_id: BookingId,
        from: WizardStep,
        to: WizardStep,
    },
    ProgressCleared {
        booking_id: BookingId,
    },
    StatusChanged {
        booking_id: BookingId,
        state: BookingState,
    },
    BalanceChanged {
        booking_id: BookingId,
        amount_due: Money,
    },
    /// Published at most once per session; the UI redirects to login on it.
    SessionExpired,
}

impl BookingEvent {
    pub fn booking_id(&self) -> Option<&BookingId> {
        match self {
            BookingEvent::GuestsUpdated { booking_id, .. }
            | BookingEvent::StepChanged { booking_id, .. }
            | BookingEvent::ProgressCleared { booking_id }
            | BookingEvent::StatusChanged { booking_id, .. }
            | BookingEvent::BalanceChanged { booking_id, .. } => Some(booking_id),
            BookingEvent::SessionExpired => None,
        }
    }
}
