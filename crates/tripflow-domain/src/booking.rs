//! Server-sourced booking snapshot.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    common::{lenient_flag, BookingId, Money},
    status::RawStatus,
};

/// Sentinel the backend uses for "no voucher attached".
pub const NO_VOUCHER_SENTINEL: &str = "none";

/// A booking exactly as last fetched. Replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSnapshot {
    pub booking_id: BookingId,
    #[serde(default, rename = "status", alias = "rawStatus")]
    pub raw_status: Option<RawStatus>,
    #[serde(
        default,
        rename = "transactionStatus",
        alias = "rawTransactionStatus",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_transaction_status: Option<RawStatus>,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub payed_amount: Money,
    #[serde(default)]
    pub deposit_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub company_confirmed_completion: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub user_confirmed_completion: bool,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub tour_end_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_confirmed_date: Option<NaiveDate>,
}

impl BookingSnapshot {
    pub fn new(booking_id: impl Into<BookingId>, raw_status: impl Into<RawStatus>) -> Self {
        Self {
            booking_id: booking_id.into(),
            raw_status: Some(raw_status.into()),
            raw_transaction_status: None,
            total_amount: 0.0,
            payed_amount: 0.0,
            deposit_amount: 0.0,
            deposit_percentage: None,
            voucher_code: None,
            company_confirmed_completion: false,
            user_confirmed_completion: false,
            tour_end_date: None,
            auto_confirmed_date: None,
        }
    }

    pub fn with_amounts(
        mut self,
        total_amount: Money,
        payed_amount: Money,
        deposit_amount: Money,
        deposit_percentage: f64,
    ) -> Self {
        self.total_amount = total_amount;
        self.payed_amount = payed_amount;
        self.deposit_amount = deposit_amount;
        self.deposit_percentage = Some(deposit_percentage);
        self
    }

    pub fn with_transaction_status(mut self, status: impl Into<RawStatus>) -> Self {
        self.raw_transaction_status = Some(status.into());
        self
    }

    pub fn with_voucher(mut self, code: impl Into<String>) -> Self {
        self.voucher_code = Some(code.into());
        self
    }

    /// Voucher attached to the booking, ignoring blanks and the `"none"` sentinel.
    pub fn effective_voucher_code(&self) -> Option<&str> {
        self.voucher_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty() && !code.eq_ignore_ascii_case(NO_VOUCHER_SENTINEL))
    }

    /// Only an explicit 0% or 100% split means a single payment; an absent percentage does not.
    pub fn is_single_payment(&self) -> bool {
        matches!(self.deposit_percentage, Some(p) if p <= 0.0 || p >= 100.0)
    }

    pub fn outstanding_balance(&self) -> Money {
        (self.total_amount - self.payed_amount).max(0.0)
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`; anything else is `None`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_date))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_payload() {
        let json = r#"{
            "bookingId": 981,
            "status": "WAITING_FOR_UPDATE",
            "transactionStatus": 1,
            "totalAmount": 1000.0,
            "payedAmount": 300,
            "depositAmount": 300,
            "depositPercentage": 30,
            "voucherCode": "none",
            "tourEndDate": "2025-06-01T09:30:00",
            "autoConfirmedDate": null
        }"#;
        let booking: BookingSnapshot = serde_json::from_str(json).expect("payload");
        assert_eq!(booking.booking_id.as_str(), "981");
        assert_eq!(
            booking.raw_status,
            Some(RawStatus::Label("WAITING_FOR_UPDATE".into()))
        );
        assert_eq!(booking.raw_transaction_status, Some(RawStatus::Code(1)));
        assert_eq!(booking.effective_voucher_code(), None);
        assert_eq!(booking.tour_end_date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(booking.auto_confirmed_date, None);
        assert!(!booking.is_single_payment());
    }

    #[test]
    fn missing_deposit_percentage_is_not_a_single_payment() {
        let json = r#"{"bookingId":1,"status":"PENDING_DEPOSIT_PAYMENT","totalAmount":1000,"depositAmount":300}"#;
        let booking: BookingSnapshot = serde_json::from_str(json).expect("payload");
        assert_eq!(booking.deposit_percentage, None);
        assert!(!booking.is_single_payment());

        let full = booking.clone().with_amounts(1000.0, 0.0, 1000.0, 100.0);
        assert!(full.is_single_payment());
        let none = booking.with_amounts(1000.0, 0.0, 0.0, 0.0);
        assert!(none.is_single_payment());
    }

    #[test]
    fn null_completion_flags_read_as_unconfirmed() {
        let json = r#"{"bookingId":"b-2","companyConfirmedCompletion":null,"userConfirmedCompletion":true}"#;
        let booking: BookingSnapshot = serde_json::from_str(json).expect("payload");
        assert!(!booking.company_confirmed_completion);
        assert!(booking.user_confirmed_completion);
    }

    #[test]
    fn garbage_dates_do_not_fail_deserialization() {
        let json = r#"{"bookingId": "b-1", "tourEndDate": "soon"}"#;
        let booking: BookingSnapshot = serde_json::from_str(json).expect("payload");
        assert_eq!(booking.tour_end_date, None);
        assert_eq!(booking.raw_status, None);
    }
}
