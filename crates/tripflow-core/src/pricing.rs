//! Amount-due and payment-leg policy over an already fetched booking and voucher preview.

use serde::{Deserialize, Serialize};
use tripflow_domain::{BookingSnapshot, BookingState, Money, PaymentIntent, VoucherPreview};

use crate::status_normalizer::StatusNormalizer;

/// Figures a checkout surface shows next to the amount due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub original_total: Money,
    pub discount: Money,
    pub final_total: Money,
    pub due_now: Money,
    /// Left to pay once `due_now` is settled.
    pub remaining_after: Money,
    pub single_payment: bool,
    pub voucher_code: Option<String>,
}

pub struct PricingReconciler;

impl PricingReconciler {
    /// Amount the customer is asked to pay now.
    pub fn amount_due(booking: &BookingSnapshot, preview: Option<&VoucherPreview>) -> Money {
        let state = StatusNormalizer::for_snapshot(booking);
        Self::amount_due_in(booking, state, preview)
    }

    /// Same as [`PricingReconciler::amount_due`] with the canonical state already known.
    pub fn amount_due_in(
        booking: &BookingSnapshot,
        state: BookingState,
        preview: Option<&VoucherPreview>,
    ) -> Money {
        let one_time = preview.map_or(false, |p| p.one_time_payment);
        if one_time || booking.is_single_payment() {
            return preview
                .and_then(|p| p.final_total)
                .unwrap_or(booking.total_amount);
        }
        match state {
            BookingState::PendingDepositPayment | BookingState::PendingPayment => preview
                .and_then(|p| p.final_deposit_amount)
                .unwrap_or(booking.deposit_amount),
            BookingState::PendingBalancePayment => preview
                .and_then(|p| p.final_remaining_amount)
                .unwrap_or_else(|| booking.outstanding_balance()),
            _ => booking.total_amount,
        }
    }

    /// Payment mode to request: explicit intent wins over inference, inference over `false`.
    pub fn is_deposit(intent: Option<PaymentIntent>, state: BookingState) -> bool {
        if let Some(intent) = intent {
            return intent == PaymentIntent::Deposit;
        }
        Self::inferred_deposit(state).unwrap_or(false)
    }

    fn inferred_deposit(state: BookingState) -> Option<bool> {
        match state {
            BookingState::PendingDepositPayment => Some(true),
            BookingState::PendingBalancePayment => Some(false),
            _ => None,
        }
    }

    /// Voucher to quote against: the explicit code when usable, else the one on the booking.
    pub fn effective_voucher<'a>(
        booking: &'a BookingSnapshot,
        requested: Option<&'a str>,
    ) -> Option<&'a str> {
        match requested.map(str::trim) {
            Some(code) if is_usable_code(code) => Some(code),
            Some(_) => None,
            None => booking.effective_voucher_code(),
        }
    }

    pub fn breakdown(booking: &BookingSnapshot, preview: Option<&VoucherPreview>) -> PaymentBreakdown {
        let state = StatusNormalizer::for_snapshot(booking);
        let due_now = Self::amount_due_in(booking, state, preview);
        let original_total = preview
            .and_then(|p| p.original_total)
            .unwrap_or(booking.total_amount);
        let final_total = preview
            .and_then(|p| p.final_total)
            .unwrap_or(booking.total_amount);
        let discount = preview
            .and_then(|p| p.discount_amount)
            .unwrap_or(original_total - final_total)
            .max(0.0);
        let outstanding = (final_total - booking.payed_amount).max(0.0);
        let voucher_code = preview
            .and_then(|p| p.voucher_code.as_deref())
            .filter(|code| is_usable_code(code))
            .or_else(|| booking.effective_voucher_code())
            .map(str::to_string);

        PaymentBreakdown {
            original_total,
            discount,
            final_total,
            due_now,
            remaining_after: (outstanding - due_now).max(0.0),
            single_payment: preview.map_or(false, |p| p.one_time_payment)
                || booking.is_single_payment(),
            voucher_code,
        }
    }
}

fn is_usable_code(code: &str) -> bool {
    let code = code.trim();
    !code.is_empty() && !code.eq_ignore_ascii_case(tripflow_domain::NO_VOUCHER_SENTINEL)
}
