//! Booking status encodings: the raw wire shapes and the canonical lifecycle enum.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A status value exactly as the backend delivered it.
///
/// Older endpoints send small integers, some send numeric strings, others send
/// legacy labels or the canonical enum names. Anything else is kept verbatim in
/// [`RawStatus::Other`] so that deserializing a booking never fails on status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStatus {
    Code(i64),
    Label(String),
    Other(serde_json::Value),
}

impl From<i64> for RawStatus {
    fn from(value: i64) -> Self {
        RawStatus::Code(value)
    }
}

impl From<&str> for RawStatus {
    fn from(value: &str) -> Self {
        RawStatus::Label(value.to_string())
    }
}

impl From<String> for RawStatus {
    fn from(value: String) -> Self {
        RawStatus::Label(value)
    }
}

impl From<BookingState> for RawStatus {
    fn from(value: BookingState) -> Self {
        RawStatus::Label(value.as_str().to_string())
    }
}

/// Canonical booking lifecycle state shared by every consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    #[default]
    PendingPayment,
    PendingDepositPayment,
    PendingBalancePayment,
    WaitingForApproved,
    WaitingForUpdate,
    BookingRejected,
    BookingFailed,
    BookingBalanceSuccess,
    BookingSuccessPending,
    BookingSuccessWaitForConfirmed,
    BookingUnderComplaint,
    BookingSuccess,
    BookingCancelled,
}

impl BookingState {
    pub const ALL: [BookingState; 13] = [
        BookingState::PendingPayment,
        BookingState::PendingDepositPayment,
        BookingState::PendingBalancePayment,
        BookingState::WaitingForApproved,
        BookingState::WaitingForUpdate,
        BookingState::BookingRejected,
        BookingState::BookingFailed,
        BookingState::BookingBalanceSuccess,
        BookingState::BookingSuccessPending,
        BookingState::BookingSuccessWaitForConfirmed,
        BookingState::BookingUnderComplaint,
        BookingState::BookingSuccess,
        BookingState::BookingCancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingState::PendingPayment => "PENDING_PAYMENT",
            BookingState::PendingDepositPayment => "PENDING_DEPOSIT_PAYMENT",
            BookingState::PendingBalancePayment => "PENDING_BALANCE_PAYMENT",
            BookingState::WaitingForApproved => "WAITING_FOR_APPROVED",
            BookingState::WaitingForUpdate => "WAITING_FOR_UPDATE",
            BookingState::BookingRejected => "BOOKING_REJECTED",
            BookingState::BookingFailed => "BOOKING_FAILED",
            BookingState::BookingBalanceSuccess => "BOOKING_BALANCE_SUCCESS",
            BookingState::BookingSuccessPending => "BOOKING_SUCCESS_PENDING",
            BookingState::BookingSuccessWaitForConfirmed => "BOOKING_SUCCESS_WAIT_FOR_CONFIRMED",
            BookingState::BookingUnderComplaint => "BOOKING_UNDER_COMPLAINT",
            BookingState::BookingSuccess => "BOOKING_SUCCESS",
            BookingState::BookingCancelled => "BOOKING_CANCELLED",
        }
    }

    /// Matches an already upper-cased, trimmed canonical name.
    pub fn from_canonical(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == value)
    }

    /// Any of the three "money still owed" states.
    pub fn is_pending_payment(self) -> bool {
        matches!(
            self,
            BookingState::PendingPayment
                | BookingState::PendingDepositPayment
                | BookingState::PendingBalancePayment
        )
    }

    pub fn is_success_family(self) -> bool {
        matches!(
            self,
            BookingState::BookingBalanceSuccess
                | BookingState::BookingSuccessPending
                | BookingState::BookingSuccessWaitForConfirmed
                | BookingState::BookingSuccess
        )
    }

    /// States after which the booking no longer changes on its own.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingState::BookingSuccess
                | BookingState::BookingRejected
                | BookingState::BookingFailed
                | BookingState::BookingCancelled
        )
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingState {
    type Err = UnknownBookingState;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::from_canonical(&normalized).ok_or(UnknownBookingState(value.to_string()))
    }
}

/// Returned by [`BookingState::from_str`] for names outside the canonical set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBookingState(pub String);

impl fmt::Display for UnknownBookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a canonical booking state", self.0)
    }
}

impl std::error::Error for UnknownBookingState {}

/// Outcome of the payment transaction attached to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransactionState {
    #[default]
    Pending,
    Success,
    Failed,
    Cancelled,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionState::Pending => "Pending",
            TransactionState::Success => "Success",
            TransactionState::Failed => "Failed",
            TransactionState::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}
