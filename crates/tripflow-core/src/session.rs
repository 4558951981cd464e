//! Staleness guard for collaborator responses.
//!
//! Every time a booking becomes active the tracker issues a fresh
//! [`SessionTicket`]. Responses are applied through the ticket they were
//! requested under; once another booking (or a reopen of the same one) took
//! over, the ticket is stale and the response is dropped.

use std::fmt;

use tracing::debug;
use tripflow_domain::BookingId;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTicket {
    booking_id: BookingId,
    epoch: Uuid,
}

impl SessionTicket {
    pub fn booking_id(&self) -> &BookingId {
        &self.booking_id
    }

    pub fn epoch(&self) -> Uuid {
        self.epoch
    }
}

impl fmt::Display for SessionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.booking_id, self.epoch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied<T> {
    Applied(T),
    Stale,
}

impl<T> Applied<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Applied::Stale)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Applied::Applied(value) => Some(value),
            Applied::Stale => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionTracker {
    current: Option<SessionTicket>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates `booking_id`, invalidating every ticket issued before.
    pub fn begin(&mut self, booking_id: BookingId) -> SessionTicket {
        let ticket = SessionTicket {
            booking_id,
            epoch: Uuid::new_v4(),
        };
        debug!(%ticket, "booking session started");
        self.current = Some(ticket.clone());
        ticket
    }

    /// Leaves the active booking; all outstanding tickets become stale.
    pub fn end(&mut self) {
        if let Some(ticket) = self.current.take() {
            debug!(%ticket, "booking session ended");
        }
    }

    pub fn current(&self) -> Option<&SessionTicket> {
        self.current.as_ref()
    }

    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.current.as_ref() == Some(ticket)
    }

    /// Runs `apply` only while `ticket` is still the active one.
    pub fn apply<T>(&self, ticket: &SessionTicket, apply: impl FnOnce() -> T) -> Applied<T> {
        if self.is_current(ticket) {
            Applied::Applied(apply())
        } else {
            debug!(%ticket, "dropping stale response");
            Applied::Stale
        }
    }
}
