//! Three-step review wizard: step gating, staged-edit commit and progress persistence.

use std::{collections::BTreeSet, sync::Arc};

use tracing::{debug, info, warn};
use tripflow_domain::{
    all_resolved, BookingEvent, BookingId, BookingSnapshot, BookingState, GuestId, GuestRecord,
    InsuranceStatus, WizardProgress, WizardStep,
};

use crate::{
    events::EventBus, gateway::BookingGateway, navigation::has_unsaved_changes,
    progress::ProgressStore, staged_edits::StagedEditBuffer, status_normalizer::StatusNormalizer,
    CoreError, GateViolation,
};

/// Display mode, orthogonal to the current step. The last two are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Active,
    /// Booking already succeeded; everything is shown, nothing can change.
    ReadOnly,
    /// Booking was rejected; only step 1 is shown.
    LockedToStep1,
}

impl WizardMode {
    pub fn is_absorbing(self) -> bool {
        !matches!(self, WizardMode::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { from: WizardStep, to: WizardStep },
    /// Allowed, but there was nowhere to go.
    Unchanged,
    /// The wizard is read-only or locked; the request was dropped.
    Ignored,
}

pub struct WizardController {
    booking: BookingSnapshot,
    state: BookingState,
    mode: WizardMode,
    current_step: WizardStep,
    completed: BTreeSet<WizardStep>,
    buffer: StagedEditBuffer,
    store: Arc<dyn ProgressStore>,
    events: EventBus,
}

impl WizardController {
    /// Builds the controller for a freshly loaded booking and applies the entry rule.
    ///
    /// Progress is always reloaded from `store`; nothing from a previous mount is reused.
    pub fn open(
        booking: BookingSnapshot,
        guests: Vec<GuestRecord>,
        store: Arc<dyn ProgressStore>,
        events: EventBus,
    ) -> Self {
        let state = StatusNormalizer::for_snapshot(&booking);
        let mut controller = Self {
            booking,
            state,
            mode: WizardMode::Active,
            current_step: WizardStep::One,
            completed: BTreeSet::new(),
            buffer: StagedEditBuffer::new(guests),
            store,
            events,
        };
        match state {
            BookingState::BookingSuccess => controller.enter_read_only(),
            BookingState::BookingRejected => controller.enter_locked(),
            _ => controller.resume(),
        }
        controller
    }

    pub fn booking(&self) -> &BookingSnapshot {
        &self.booking
    }

    pub fn booking_id(&self) -> &BookingId {
        &self.booking.booking_id
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn completed_steps(&self) -> &BTreeSet<WizardStep> {
        &self.completed
    }

    pub fn is_complete(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    pub fn buffer(&self) -> &StagedEditBuffer {
        &self.buffer
    }

    /// Staged guest list as the UI should render it.
    pub fn guests(&self) -> &[GuestRecord] {
        self.buffer.staged()
    }

    pub fn progress(&self) -> WizardProgress {
        WizardProgress::at(
            self.booking_id().clone(),
            self.current_step,
            self.completed.iter().copied(),
        )
    }

    /// The single signal every navigation interceptor reads.
    pub fn has_unsaved_changes(&self) -> bool {
        has_unsaved_changes(self.mode, self.completed.len(), self.state)
    }

    /// Step 1 approval: marks step 1 complete and advances to step 2.
    pub fn approve_step_one(&mut self) -> Result<StepOutcome, CoreError> {
        if self.mode.is_absorbing() {
            return Ok(self.ignored("approve step one"));
        }
        if self.current_step != WizardStep::One {
            return Err(GateViolation::StepNotReachable {
                from: self.current_step,
                to: WizardStep::Two,
            }
            .into());
        }
        let mut completed = self.completed.clone();
        completed.insert(WizardStep::One);
        Ok(self.set_position(WizardStep::Two, completed))
    }

    /// Stages an insurance status. Only step 2 accepts edits.
    pub fn stage_insurance(
        &mut self,
        guest_id: GuestId,
        status: InsuranceStatus,
    ) -> Result<(), CoreError> {
        if self.mode.is_absorbing() {
            self.ignored("stage insurance");
            return Ok(());
        }
        self.ensure_editable()?;
        self.buffer.apply(guest_id, status)
    }

    pub fn approve_all_guests(&mut self) -> Result<(), CoreError> {
        if self.mode.is_absorbing() {
            self.ignored("approve all guests");
            return Ok(());
        }
        self.ensure_editable()?;
        self.buffer.approve_all();
        Ok(())
    }

    /// Step 2 → step 3. Commits the staged change-set first and only advances if it succeeds.
    pub fn commit_step_two(
        &mut self,
        gateway: &dyn BookingGateway,
    ) -> Result<StepOutcome, CoreError> {
        if self.mode.is_absorbing() {
            return Ok(self.ignored("commit step two"));
        }
        if self.current_step != WizardStep::Two {
            return Err(GateViolation::StepNotReachable {
                from: self.current_step,
                to: WizardStep::Three,
            }
            .into());
        }
        if !self.buffer.all_resolved() {
            let pending = self
                .buffer
                .unresolved()
                .map(|guest| guest.full_name.clone())
                .collect();
            return Err(GateViolation::GuestsUnresolved { pending }.into());
        }

        let booking_id = self.booking_id().clone();
        self.buffer.commit(&booking_id, gateway)?;
        self.events.publish(BookingEvent::GuestsUpdated {
            booking_id,
            guests: self.buffer.baseline().to_vec(),
        });

        let mut completed = self.completed.clone();
        completed.insert(WizardStep::Two);
        Ok(self.set_position(WizardStep::Three, completed))
    }

    /// One step back. Uncommitted staged edits are discarded.
    pub fn back(&mut self) -> Result<StepOutcome, CoreError> {
        if self.mode.is_absorbing() {
            return Ok(self.ignored("back"));
        }
        match self.current_step.previous() {
            Some(previous) => {
                self.buffer.discard();
                Ok(self.set_position(previous, self.completed.clone()))
            }
            None => Ok(StepOutcome::Unchanged),
        }
    }

    /// Direct navigation to `target`: any earlier step, or the next one once the current step is complete.
    pub fn jump_to(&mut self, target: WizardStep) -> Result<StepOutcome, CoreError> {
        if self.mode.is_absorbing() {
            return Ok(self.ignored("jump"));
        }
        let current = self.current_step;
        if target == current {
            return Ok(StepOutcome::Unchanged);
        }
        if target < current {
            self.buffer.discard();
            return Ok(self.set_position(target, self.completed.clone()));
        }
        if current == WizardStep::One
            && target == WizardStep::Two
            && !self.completed.contains(&current)
        {
            return Err(GateViolation::StepOneNotApproved.into());
        }
        if current.next() != Some(target) || !self.completed.contains(&current) {
            return Err(GateViolation::StepNotReachable {
                from: current,
                to: target,
            }
            .into());
        }
        if self.buffer.is_dirty() {
            return Err(GateViolation::UncommittedChanges.into());
        }
        Ok(self.set_position(target, self.completed.clone()))
    }

    /// Replaces the booking snapshot wholesale and re-derives the canonical state.
    ///
    /// A transition into success or rejection moves the wizard into the matching
    /// absorbing mode and clears stored progress.
    pub fn refresh(&mut self, booking: BookingSnapshot) -> BookingState {
        let state = StatusNormalizer::for_snapshot(&booking);
        self.booking = booking;
        if state != self.state {
            info!(
                booking = %self.booking_id(),
                from = %self.state,
                to = %state,
                "booking state changed"
            );
            self.state = state;
            self.events.publish(BookingEvent::StatusChanged {
                booking_id: self.booking_id().clone(),
                state,
            });
        }
        if !self.mode.is_absorbing() {
            match state {
                BookingState::BookingSuccess => self.enter_read_only(),
                BookingState::BookingRejected => self.enter_locked(),
                _ => {}
            }
        }
        state
    }

    /// Adopts a refetched guest list as the new baseline, dropping staged edits.
    pub fn replace_guests(&mut self, guests: Vec<GuestRecord>) {
        self.buffer.replace_baseline(guests);
    }

    /// Gives up on the wizard: clears stored progress and staged edits.
    pub fn abandon(&mut self) {
        self.buffer.discard();
        if self.mode.is_absorbing() {
            return;
        }
        self.current_step = WizardStep::One;
        self.completed.clear();
        self.clear_progress();
        info!(booking = %self.booking_id(), "wizard abandoned");
    }

    fn resume(&mut self) {
        let stored = self.store.load(self.booking_id());
        let (step, completed) = if stored.is_complete(WizardStep::One) {
            let guests = self.buffer.baseline();
            let shortcut = !guests.is_empty() && all_resolved(guests);
            if stored.is_complete(WizardStep::Two) || shortcut {
                (
                    WizardStep::Three,
                    BTreeSet::from([WizardStep::One, WizardStep::Two]),
                )
            } else {
                (WizardStep::Two, BTreeSet::from([WizardStep::One]))
            }
        } else {
            (WizardStep::One, BTreeSet::new())
        };
        debug!(
            booking = %self.booking_id(),
            stored = %stored.current_step,
            resumed = %step,
            "wizard resumed"
        );
        self.set_position(step, completed);
    }

    fn enter_read_only(&mut self) {
        self.mode = WizardMode::ReadOnly;
        self.current_step = WizardStep::Three;
        self.completed = WizardStep::ALL.into_iter().collect();
        self.buffer.discard();
        self.clear_progress();
        info!(booking = %self.booking_id(), "wizard is read-only");
    }

    fn enter_locked(&mut self) {
        self.mode = WizardMode::LockedToStep1;
        self.current_step = WizardStep::One;
        self.completed.clear();
        self.buffer.discard();
        self.clear_progress();
        info!(booking = %self.booking_id(), "wizard locked to step 1");
    }

    fn ensure_editable(&self) -> Result<(), CoreError> {
        if self.current_step == WizardStep::Two {
            Ok(())
        } else {
            Err(GateViolation::EditsClosed(self.current_step).into())
        }
    }

    /// The only place step and completion change while active; always persisted together.
    fn set_position(&mut self, step: WizardStep, completed: BTreeSet<WizardStep>) -> StepOutcome {
        let from = self.current_step;
        self.current_step = step;
        self.completed = completed;
        if let Err(err) = self
            .store
            .save(&self.booking.booking_id, step, &self.completed)
        {
            warn!(booking = %self.booking_id(), error = %err, "failed to persist wizard progress");
        }
        if from == step {
            return StepOutcome::Unchanged;
        }
        info!(booking = %self.booking_id(), %from, to = %step, "wizard step changed");
        self.events.publish(BookingEvent::StepChanged {
            booking_id: self.booking_id().clone(),
            from,
            to: step,
        });
        StepOutcome::Moved { from, to: step }
    }

    fn clear_progress(&self) {
        if let Err(err) = self.store.clear(self.booking_id()) {
            warn!(booking = %self.booking_id(), error = %err, "failed to clear wizard progress");
        }
        self.events.publish(BookingEvent::ProgressCleared {
            booking_id: self.booking_id().clone(),
        });
    }

    fn ignored(&self, action: &str) -> StepOutcome {
        debug!(booking = %self.booking_id(), mode = ?self.mode, action, "wizard action ignored");
        StepOutcome::Ignored
    }
}
