//! Local guest edits held back from the server until the wizard commits them.

use std::collections::HashMap;

use tracing::{info, warn};
use tripflow_domain::{
    BookingId, GuestChange, GuestId, GuestRecord, InsuranceStatus, PendingChangeSet,
};

use crate::{gateway::BookingGateway, CoreError};

/// Baseline (server-acknowledged) and staged copies of a booking's guests.
///
/// Staged rows are always keyed 1:1 with baseline rows. Nothing here talks to the
/// network except [`StagedEditBuffer::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedEditBuffer {
    baseline: Vec<GuestRecord>,
    staged: Vec<GuestRecord>,
}

impl StagedEditBuffer {
    pub fn new(baseline: Vec<GuestRecord>) -> Self {
        Self {
            staged: baseline.clone(),
            baseline,
        }
    }

    pub fn baseline(&self) -> &[GuestRecord] {
        &self.baseline
    }

    pub fn staged(&self) -> &[GuestRecord] {
        &self.staged
    }

    /// Stages a new status for one guest. Last write wins.
    pub fn apply(&mut self, guest_id: GuestId, status: InsuranceStatus) -> Result<(), CoreError> {
        let guest = self
            .staged
            .iter_mut()
            .find(|guest| guest.booking_guest_id == guest_id)
            .ok_or(CoreError::UnknownGuest(guest_id))?;
        guest.insurance_status = status;
        Ok(())
    }

    /// Stages `Success` for every guest.
    pub fn approve_all(&mut self) {
        for guest in &mut self.staged {
            guest.insurance_status = InsuranceStatus::Success;
        }
    }

    pub fn pending_changes(&self) -> PendingChangeSet {
        diff(&self.baseline, &self.staged)
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending_changes().is_empty()
    }

    pub fn all_resolved(&self) -> bool {
        self.staged.iter().all(GuestRecord::is_resolved)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &GuestRecord> {
        self.staged.iter().filter(|guest| !guest.is_resolved())
    }

    /// Drops every staged edit.
    pub fn discard(&mut self) {
        self.staged = self.baseline.clone();
    }

    /// Adopts a freshly fetched guest list; staged edits are reset to it.
    pub fn replace_baseline(&mut self, guests: Vec<GuestRecord>) {
        self.staged = guests.clone();
        self.baseline = guests;
    }

    /// Sends the pending change-set and, on success, promotes staged to baseline.
    ///
    /// On failure the staged copy is left untouched so the caller can retry.
    pub fn commit(
        &mut self,
        booking_id: &BookingId,
        gateway: &dyn BookingGateway,
    ) -> Result<PendingChangeSet, CoreError> {
        let changes = self.pending_changes();
        if !changes.is_empty() {
            if let Err(err) = gateway.commit_insurance(booking_id, &changes) {
                warn!(
                    booking = %booking_id,
                    changes = changes.len(),
                    error = %err,
                    "insurance commit failed; staged edits kept"
                );
                return Err(CoreError::Commit(err));
            }
        }
        info!(booking = %booking_id, changes = changes.len(), "insurance changes committed");
        self.baseline = self.staged.clone();
        Ok(changes)
    }
}

/// Entries whose staged status differs from baseline, in baseline order.
///
/// Staged rows without a baseline counterpart are ignored.
pub fn diff(baseline: &[GuestRecord], staged: &[GuestRecord]) -> PendingChangeSet {
    let staged_by_id: HashMap<GuestId, InsuranceStatus> = staged
        .iter()
        .map(|guest| (guest.booking_guest_id, guest.insurance_status))
        .collect();
    let entries = baseline
        .iter()
        .filter_map(|guest| {
            let to_status = *staged_by_id.get(&guest.booking_guest_id)?;
            (to_status != guest.insurance_status).then_some(GuestChange {
                guest_id: guest.booking_guest_id,
                from_status: guest.insurance_status,
                to_status,
            })
        })
        .collect();
    PendingChangeSet::new(entries)
}
