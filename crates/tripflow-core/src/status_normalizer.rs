//! Collapses every raw status encoding into [`BookingState`].
//!
//! Normalization is total: unknown input narrows to `PENDING_PAYMENT` and is
//! never reported as an error.

use tracing::debug;
use tripflow_domain::{BookingSnapshot, BookingState, RawStatus, TransactionState};

pub struct StatusNormalizer;

impl StatusNormalizer {
    /// Canonical state for a booking status, with the paid-transaction override applied.
    pub fn normalize(
        raw_status: Option<&RawStatus>,
        raw_transaction_status: Option<&RawStatus>,
    ) -> BookingState {
        if Self::normalize_transaction(raw_transaction_status) == TransactionState::Success {
            return BookingState::BookingSuccess;
        }
        Self::normalize_status(raw_status)
    }

    pub fn for_snapshot(booking: &BookingSnapshot) -> BookingState {
        Self::normalize(
            booking.raw_status.as_ref(),
            booking.raw_transaction_status.as_ref(),
        )
    }

    /// Booking status alone, without consulting the transaction.
    pub fn normalize_status(raw_status: Option<&RawStatus>) -> BookingState {
        match raw_status {
            None => BookingState::PendingPayment,
            Some(RawStatus::Code(code)) => legacy_code(*code),
            Some(RawStatus::Label(label)) => Self::normalize_label(label),
            Some(RawStatus::Other(value)) => {
                debug!(%value, "unrecognised booking status shape");
                BookingState::PendingPayment
            }
        }
    }

    pub fn normalize_label(label: &str) -> BookingState {
        let trimmed = label.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return legacy_code(code);
        }
        let upper = trimmed.to_ascii_uppercase();
        if let Some(state) = BookingState::from_canonical(&upper) {
            return state;
        }
        match legacy_label(&upper) {
            Some(state) => state,
            None => {
                debug!(label = %trimmed, "unknown booking status label");
                BookingState::PendingPayment
            }
        }
    }

    pub fn normalize_transaction(raw: Option<&RawStatus>) -> TransactionState {
        match raw {
            Some(RawStatus::Code(1)) => TransactionState::Success,
            Some(RawStatus::Code(2)) => TransactionState::Failed,
            Some(RawStatus::Label(label)) => {
                let upper = label.trim().to_ascii_uppercase();
                match upper.as_str() {
                    "1" | "SUCCESS" | "PURCHASED" | "CONFIRMED" | "COMPLETED" | "PAID"
                    | "BOOKING_SUCCESS" => TransactionState::Success,
                    "2" | "FAILED" | "REJECTED" => TransactionState::Failed,
                    "CANCELLED" | "CANCELED" => TransactionState::Cancelled,
                    _ => TransactionState::Pending,
                }
            }
            _ => TransactionState::Pending,
        }
    }
}

fn legacy_code(code: i64) -> BookingState {
    match code {
        1 => BookingState::BookingSuccess,
        2 => BookingState::BookingRejected,
        _ => BookingState::PendingPayment,
    }
}

fn legacy_label(upper: &str) -> Option<BookingState> {
    match upper {
        "PURCHASED" | "CONFIRMED" | "SUCCESS" => Some(BookingState::BookingSuccess),
        "PENDING" => Some(BookingState::PendingPayment),
        "CANCELLED" => Some(BookingState::BookingCancelled),
        "FAILED" => Some(BookingState::BookingFailed),
        _ => None,
    }
}
