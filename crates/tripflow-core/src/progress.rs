//! Resumable wizard progress, keyed per booking.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use tracing::warn;
use tripflow_domain::{BookingId, WizardProgress, WizardStep};

use crate::CoreError;

pub const DEFAULT_KEY_PREFIX: &str = "booking-wizard-progress-";

/// Durable storage for [`WizardProgress`].
///
/// `load` never fails: missing or corrupt entries read as fresh progress.
/// `save` overwrites whatever was stored (last write wins).
pub trait ProgressStore: Send + Sync {
    fn load(&self, booking_id: &BookingId) -> WizardProgress;
    fn save(
        &self,
        booking_id: &BookingId,
        step: WizardStep,
        completed: &BTreeSet<WizardStep>,
    ) -> Result<(), CoreError>;
    fn clear(&self, booking_id: &BookingId) -> Result<(), CoreError>;
}

/// Storage key for a booking's progress blob.
pub fn progress_key(prefix: &str, booking_id: &BookingId) -> String {
    format!("{}{}", prefix, booking_id)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredProgressRef<'a> {
    current_step: WizardStep,
    completed_steps: &'a BTreeSet<WizardStep>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProgress {
    current_step: i64,
    #[serde(default)]
    completed_steps: Vec<i64>,
}

pub fn encode_progress(
    step: WizardStep,
    completed: &BTreeSet<WizardStep>,
) -> Result<String, CoreError> {
    Ok(serde_json::to_string(&StoredProgressRef {
        current_step: step,
        completed_steps: completed,
    })?)
}

/// Decodes a stored blob, falling back to fresh progress on anything unusable.
pub fn decode_progress(booking_id: &BookingId, raw: &str) -> WizardProgress {
    let stored: StoredProgress = match serde_json::from_str(raw) {
        Ok(stored) => stored,
        Err(err) => {
            warn!(booking = %booking_id, error = %err, "discarding corrupt wizard progress");
            return WizardProgress::new(booking_id.clone());
        }
    };
    let Some(current_step) = step_from_i64(stored.current_step) else {
        warn!(
            booking = %booking_id,
            step = stored.current_step,
            "discarding wizard progress with out-of-range step"
        );
        return WizardProgress::new(booking_id.clone());
    };
    let completed = stored
        .completed_steps
        .into_iter()
        .filter_map(step_from_i64)
        .collect::<BTreeSet<_>>();
    WizardProgress::at(booking_id.clone(), current_step, completed)
}

fn step_from_i64(value: i64) -> Option<WizardStep> {
    u8::try_from(value).ok().and_then(WizardStep::from_number)
}

/// In-process store holding the same JSON blobs the durable store writes.
#[derive(Debug)]
pub struct MemoryProgressStore {
    prefix: String,
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    /// Stores an arbitrary blob, bypassing encoding.
    pub fn insert_raw(&self, booking_id: &BookingId, raw: impl Into<String>) {
        let key = progress_key(&self.prefix, booking_id);
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, raw.into());
    }

    pub fn raw(&self, booking_id: &BookingId) -> Option<String> {
        let key = progress_key(&self.prefix, booking_id);
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    pub fn contains(&self, booking_id: &BookingId) -> bool {
        self.raw(booking_id).is_some()
    }
}

impl Default for MemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, booking_id: &BookingId) -> WizardProgress {
        match self.raw(booking_id) {
            Some(raw) => decode_progress(booking_id, &raw),
            None => WizardProgress::new(booking_id.clone()),
        }
    }

    fn save(
        &self,
        booking_id: &BookingId,
        step: WizardStep,
        completed: &BTreeSet<WizardStep>,
    ) -> Result<(), CoreError> {
        let blob = encode_progress(step, completed)?;
        self.insert_raw(booking_id, blob);
        Ok(())
    }

    fn clear(&self, booking_id: &BookingId) -> Result<(), CoreError> {
        let key = progress_key(&self.prefix, booking_id);
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }
}
