use tripflow_domain::{
    BookingId, BookingSnapshot, BookingState, GuestRecord, PendingChangeSet, VoucherPreview,
};

use crate::GatewayError;

/// Backend collaborators consumed by the booking flow. Transport and auth live behind it.
///
/// Implementations map authentication failures to [`GatewayError::SessionExpired`].
pub trait BookingGateway: Send + Sync {
    fn fetch_booking(&self, booking_id: &BookingId) -> Result<BookingSnapshot, GatewayError>;

    fn fetch_guests(&self, booking_id: &BookingId) -> Result<Vec<GuestRecord>, GatewayError>;

    fn change_status(
        &self,
        booking_id: &BookingId,
        status: BookingState,
        message: Option<&str>,
    ) -> Result<BookingSnapshot, GatewayError>;

    /// Applies every entry of the change-set. Must be idempotent: a retry after a
    /// partial failure re-sends the whole set.
    fn commit_insurance(
        &self,
        booking_id: &BookingId,
        changes: &PendingChangeSet,
    ) -> Result<(), GatewayError>;

    /// `None` means "whatever voucher is already attached to the booking".
    fn preview_voucher(
        &self,
        booking_id: &BookingId,
        voucher_code: Option<&str>,
    ) -> Result<VoucherPreview, GatewayError>;

    fn company_confirm_completion(&self, booking_id: &BookingId) -> Result<(), GatewayError>;

    fn user_confirm_completion(&self, booking_id: &BookingId) -> Result<(), GatewayError>;

    fn tour_completion_status(&self, booking_id: &BookingId) -> Result<bool, GatewayError>;
}
