//! Voucher quotes and payment-leg intents.

use std::fmt;

use serde::{de::Deserializer, Deserialize, Serialize};

use crate::common::{lenient_flag, Money};

/// Point-in-time discount quote for a booking/voucher pairing.
///
/// Every amount is optional: partial previews fall back to the booking's own
/// figures field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoucherPreview {
    pub original_total: Option<Money>,
    pub discount_amount: Option<Money>,
    pub final_total: Option<Money>,
    pub final_deposit_amount: Option<Money>,
    pub final_remaining_amount: Option<Money>,
    #[serde(deserialize_with = "lenient_flag")]
    pub one_time_payment: bool,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    pub voucher_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
    Other,
}

impl DiscountType {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PERCENT" | "PERCENTAGE" => DiscountType::Percentage,
            "FIXED" | "FIXED_AMOUNT" | "AMOUNT" => DiscountType::FixedAmount,
            _ => DiscountType::Other,
        }
    }
}

impl<'de> Deserialize<'de> for DiscountType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(DiscountType::from_str(&value))
    }
}

/// Payment leg a caller explicitly asks the gateway for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentIntent {
    Deposit,
    Balance,
    Full,
}

impl PaymentIntent {
    /// Parses navigation state such as `"deposit"`; anything unrecognised is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deposit" => Some(PaymentIntent::Deposit),
            "balance" | "remaining" => Some(PaymentIntent::Balance),
            "full" => Some(PaymentIntent::Full),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentIntent::Deposit => "deposit",
            PaymentIntent::Balance => "balance",
            PaymentIntent::Full => "full",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_preview_deserializes() {
        let preview: VoucherPreview = serde_json::from_str(
            r#"{"finalRemainingAmount": 650, "discountType": "percent", "voucherCode": "SUMMER"}"#,
        )
        .expect("preview");
        assert_eq!(preview.final_remaining_amount, Some(650.0));
        assert_eq!(preview.final_total, None);
        assert!(!preview.one_time_payment);
        assert_eq!(preview.discount_type, Some(DiscountType::Percentage));
    }

    #[test]
    fn null_one_time_flag_reads_as_split_payment() {
        let preview: VoucherPreview =
            serde_json::from_str(r#"{"finalTotal":900,"oneTimePayment":null}"#).expect("preview");
        assert_eq!(preview.final_total, Some(900.0));
        assert!(!preview.one_time_payment);

        let preview: VoucherPreview =
            serde_json::from_str(r#"{"oneTimePayment":true,"discountType":null}"#).expect("preview");
        assert!(preview.one_time_payment);
        assert_eq!(preview.discount_type, None);
    }

    #[test]
    fn intent_parsing_ignores_case() {
        assert_eq!(PaymentIntent::parse(" Deposit "), Some(PaymentIntent::Deposit));
        assert_eq!(PaymentIntent::parse("later"), None);
    }
}
