//! Wizard steps and the persisted progress blob.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::common::BookingId;

/// One of the three review steps. Serialized as its step number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    One,
    Two,
    Three,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [WizardStep::One, WizardStep::Two, WizardStep::Three];

    pub fn number(self) -> u8 {
        match self {
            WizardStep::One => 1,
            WizardStep::Two => 2,
            WizardStep::Three => 3,
        }
    }

    pub fn from_number(value: u8) -> Option<Self> {
        match value {
            1 => Some(WizardStep::One),
            2 => Some(WizardStep::Two),
            3 => Some(WizardStep::Three),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number().saturating_sub(1))
    }
}

impl From<WizardStep> for u8 {
    fn from(value: WizardStep) -> Self {
        value.number()
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = InvalidStep;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        WizardStep::from_number(value).ok_or(InvalidStep(value))
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidStep(pub u8);

impl fmt::Display for InvalidStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wizard step must be between 1 and 3, got {}", self.0)
    }
}

impl std::error::Error for InvalidStep {}

/// Resumable wizard position for one booking.
///
/// Only `currentStep` and `completedSteps` are part of the stored blob; the
/// booking id is the storage key and is filled in by the store on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardProgress {
    #[serde(skip)]
    pub booking_id: BookingId,
    pub current_step: WizardStep,
    #[serde(default)]
    pub completed_steps: BTreeSet<WizardStep>,
}

impl WizardProgress {
    /// Fresh progress: step 1, nothing completed.
    pub fn new(booking_id: BookingId) -> Self {
        Self {
            booking_id,
            current_step: WizardStep::One,
            completed_steps: BTreeSet::new(),
        }
    }

    pub fn at(
        booking_id: BookingId,
        current_step: WizardStep,
        completed_steps: impl IntoIterator<Item = WizardStep>,
    ) -> Self {
        Self {
            booking_id,
            current_step,
            completed_steps: completed_steps.into_iter().collect(),
        }
    }

    pub fn is_complete(&self, step: WizardStep) -> bool {
        self.completed_steps.contains(&step)
    }

    pub fn is_fresh(&self) -> bool {
        self.current_step == WizardStep::One && self.completed_steps.is_empty()
    }
}
