//! Minimal change-sets produced from staged guest edits.

use serde::{Deserialize, Serialize};

use crate::{common::GuestId, guest::InsuranceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestChange {
    pub guest_id: GuestId,
    pub from_status: InsuranceStatus,
    pub to_status: InsuranceStatus,
}

/// Ordered list of guest changes, in baseline order. Consumed once by a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingChangeSet {
    entries: Vec<GuestChange>,
}

impl PendingChangeSet {
    pub fn new(entries: Vec<GuestChange>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[GuestChange] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GuestChange> {
        self.entries.iter()
    }

    pub fn touches(&self, guest_id: GuestId) -> bool {
        self.entries.iter().any(|change| change.guest_id == guest_id)
    }
}

impl IntoIterator for PendingChangeSet {
    type Item = GuestChange;
    type IntoIter = std::vec::IntoIter<GuestChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a PendingChangeSet {
    type Item = &'a GuestChange;
    type IntoIter = std::slice::Iter<'a, GuestChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
