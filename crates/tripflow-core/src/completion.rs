//! Tour-completion confirmation state and the auto-confirm display date.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tripflow_domain::{BookingSnapshot, BookingState};

use crate::time::Clock;

pub const DEFAULT_AUTO_CONFIRM_FALLBACK_DAYS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    AwaitingBoth,
    AwaitingCompany,
    AwaitingUser,
    BothConfirmed,
}

impl CompletionStatus {
    pub fn from_flags(company_confirmed: bool, user_confirmed: bool) -> Self {
        match (company_confirmed, user_confirmed) {
            (true, true) => CompletionStatus::BothConfirmed,
            (true, false) => CompletionStatus::AwaitingUser,
            (false, true) => CompletionStatus::AwaitingCompany,
            (false, false) => CompletionStatus::AwaitingBoth,
        }
    }

    pub fn of(booking: &BookingSnapshot) -> Self {
        Self::from_flags(
            booking.company_confirmed_completion,
            booking.user_confirmed_completion,
        )
    }

    pub fn is_complete(self) -> bool {
        self == CompletionStatus::BothConfirmed
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CompletionStatus::AwaitingBoth => "awaiting both parties",
            CompletionStatus::AwaitingCompany => "awaiting company",
            CompletionStatus::AwaitingUser => "awaiting user",
            CompletionStatus::BothConfirmed => "both confirmed",
        };
        f.write_str(label)
    }
}

/// Confirmation only makes sense once the booking went through.
pub fn can_confirm_completion(state: BookingState) -> bool {
    state.is_success_family()
}

/// Date to show as the auto-confirm deadline.
///
/// The server date is authoritative. Without it the tour end date plus
/// `fallback_days` is shown. Nothing is scheduled from this value.
pub fn auto_confirm_display_date(booking: &BookingSnapshot, fallback_days: u32) -> Option<NaiveDate> {
    booking.auto_confirmed_date.or_else(|| {
        booking
            .tour_end_date
            .and_then(|end| end.checked_add_signed(Duration::days(i64::from(fallback_days))))
    })
}

/// Whole days from today until the display date; negative once it has passed.
pub fn days_until_auto_confirm(
    booking: &BookingSnapshot,
    fallback_days: u32,
    clock: &dyn Clock,
) -> Option<i64> {
    auto_confirm_display_date(booking, fallback_days)
        .map(|date| date.signed_duration_since(clock.today()).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn status_tracks_both_flags() {
        let mut booking = BookingSnapshot::new("b-1", "BOOKING_SUCCESS_WAIT_FOR_CONFIRMED");
        assert_eq!(CompletionStatus::of(&booking), CompletionStatus::AwaitingBoth);
        booking.company_confirmed_completion = true;
        assert_eq!(CompletionStatus::of(&booking), CompletionStatus::AwaitingUser);
        booking.user_confirmed_completion = true;
        assert!(CompletionStatus::of(&booking).is_complete());
        booking.company_confirmed_completion = false;
        assert_eq!(CompletionStatus::of(&booking), CompletionStatus::AwaitingCompany);
    }

    #[test]
    fn server_date_wins_over_fallback() {
        let mut booking = BookingSnapshot::new("b-1", "BOOKING_SUCCESS_PENDING");
        booking.tour_end_date = Some(date(2026, 5, 10));
        assert_eq!(
            auto_confirm_display_date(&booking, DEFAULT_AUTO_CONFIRM_FALLBACK_DAYS),
            Some(date(2026, 5, 13))
        );

        booking.auto_confirmed_date = Some(date(2026, 5, 20));
        assert_eq!(
            auto_confirm_display_date(&booking, DEFAULT_AUTO_CONFIRM_FALLBACK_DAYS),
            Some(date(2026, 5, 20))
        );
    }

    #[test]
    fn no_dates_means_nothing_to_show() {
        let booking = BookingSnapshot::new("b-1", "BOOKING_SUCCESS_PENDING");
        assert_eq!(auto_confirm_display_date(&booking, 3), None);
        assert_eq!(
            days_until_auto_confirm(&booking, 3, &FixedClock::on(date(2026, 1, 1))),
            None
        );
    }

    #[test]
    fn days_until_counts_from_clock() {
        let mut booking = BookingSnapshot::new("b-1", "BOOKING_SUCCESS_PENDING");
        booking.tour_end_date = Some(date(2026, 5, 10));
        let clock = FixedClock::on(date(2026, 5, 11));
        assert_eq!(days_until_auto_confirm(&booking, 3, &clock), Some(2));
        let late = FixedClock::on(date(2026, 5, 15));
        assert_eq!(days_until_auto_confirm(&booking, 3, &late), Some(-2));
    }

    #[test]
    fn confirmation_needs_a_successful_booking() {
        assert!(can_confirm_completion(BookingState::BookingSuccessWaitForConfirmed));
        assert!(can_confirm_completion(BookingState::BookingSuccess));
        assert!(!can_confirm_completion(BookingState::PendingBalancePayment));
        assert!(!can_confirm_completion(BookingState::BookingRejected));
    }
}
