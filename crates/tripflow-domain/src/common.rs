//! Shared identifiers and value types for booking primitives.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Monetary amounts as delivered by the backend (already in the booking currency).
pub type Money = f64;

/// Identifier of a guest row attached to a booking.
pub type GuestId = i64;

/// Nullable backend booleans: a missing or `null` flag reads as `false`.
pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Stable identifier of a booking. The backend emits it either as a string or a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookingId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BookingId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<i64> for BookingId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for BookingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(i64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(value) => BookingId::new(value),
            Repr::Number(value) => BookingId::from(value),
        })
    }
}
