//! Guest rows and their insurance lifecycle.

use std::fmt;

use serde::{de::Deserializer, Deserialize, Serialize};

use crate::common::GuestId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecord {
    pub booking_guest_id: GuestId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub insurance_status: InsuranceStatus,
}

impl GuestRecord {
    pub fn new(booking_guest_id: GuestId, full_name: impl Into<String>) -> Self {
        Self {
            booking_guest_id,
            full_name: full_name.into(),
            insurance_status: InsuranceStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: InsuranceStatus) -> Self {
        self.insurance_status = status;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.insurance_status == InsuranceStatus::Success
    }
}

/// Insurance state of a single guest. Unknown wire values read as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsuranceStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl InsuranceStatus {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" | "APPROVED" => InsuranceStatus::Success,
            "FAILED" | "REJECTED" => InsuranceStatus::Failed,
            _ => InsuranceStatus::Pending,
        }
    }
}

impl fmt::Display for InsuranceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InsuranceStatus::Pending => "Pending",
            InsuranceStatus::Success => "Success",
            InsuranceStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for InsuranceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|v| InsuranceStatus::from_str(&v))
            .unwrap_or_default())
    }
}

/// True when every guest's insurance has been resolved to `Success`.
pub fn all_resolved(guests: &[GuestRecord]) -> bool {
    guests.iter().all(GuestRecord::is_resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insurance_status_is_lenient() {
        let guest: GuestRecord = serde_json::from_str(
            r#"{"bookingGuestId": 7, "fullName": "Linh", "insuranceStatus": "success"}"#,
        )
        .expect("guest");
        assert_eq!(guest.insurance_status, InsuranceStatus::Success);

        let unknown: InsuranceStatus = serde_json::from_str("\"IN_REVIEW\"").expect("status");
        assert_eq!(unknown, InsuranceStatus::Pending);
    }

    #[test]
    fn empty_guest_list_counts_as_resolved() {
        assert!(all_resolved(&[]));
        assert!(!all_resolved(&[GuestRecord::new(1, "A")]));
    }
}
