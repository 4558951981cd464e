//! One active booking, its review wizard and the collaborator calls around it.
//!
//! Collaborator responses are applied through the [`SessionTicket`] they were
//! requested under. Hosts that issue requests asynchronously use the
//! `begin_open` / `install` / `apply_*` pairs directly; the blocking helpers
//! (`open`, `refresh`, ...) are built from the same pieces.

use std::{result::Result as StdResult, sync::mpsc::Receiver, sync::Arc};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tripflow_config::Config;
use tripflow_core::{
    auto_confirm_display_date, can_confirm_completion, days_until_auto_confirm, Applied,
    BookingGateway, Clock, CompletionStatus, CoreError, EventBus, GatewayError, GuardDecision,
    HistoryAction, LeaveAction, NavigationAttempt, NavigationGuard, PaymentBreakdown,
    PricingReconciler, ProgressStore, SessionTicket, SessionTracker, StepOutcome, SystemClock,
    WizardController,
};
use tripflow_domain::{
    BookingEvent, BookingId, BookingSnapshot, BookingState, GuestId, GuestRecord, InsuranceStatus,
    Money, PaymentIntent, VoucherPreview, WizardStep,
};
use tripflow_storage_json::JsonProgressStore;

use crate::errors::{FlowError, Result};

/// Session-level knobs, usually taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub app_origin: String,
    pub wizard_path: String,
    pub auto_confirm_fallback_days: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            app_origin: config.app_origin.clone(),
            wizard_path: config.wizard_path.clone(),
            auto_confirm_fallback_days: config.auto_confirm_fallback_days,
        }
    }
}

pub struct BookingSession {
    gateway: Arc<dyn BookingGateway>,
    store: Arc<dyn ProgressStore>,
    events: EventBus,
    settings: SessionSettings,
    tracker: SessionTracker,
    guard: NavigationGuard,
    wizard: Option<WizardController>,
    preview: Option<VoucherPreview>,
    history: Vec<HistoryAction>,
    clock: Arc<dyn Clock>,
    expired: bool,
}

impl BookingSession {
    pub fn new(
        gateway: Arc<dyn BookingGateway>,
        store: Arc<dyn ProgressStore>,
        events: EventBus,
        settings: SessionSettings,
    ) -> Self {
        let guard = NavigationGuard::new(settings.app_origin.clone(), settings.wizard_path.clone());
        Self {
            gateway,
            store,
            events,
            settings,
            tracker: SessionTracker::new(),
            guard,
            wizard: None,
            preview: None,
            history: Vec::new(),
            clock: Arc::new(SystemClock),
            expired: false,
        }
    }

    /// Replaces the clock behind date countdowns.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Session persisting wizard progress as JSON files under the configured directory.
    pub fn from_config(gateway: Arc<dyn BookingGateway>, config: &Config) -> Result<Self> {
        let store = JsonProgressStore::with_prefix(
            config.resolve_progress_dir(),
            config.progress_key_prefix.clone(),
        )?;
        Ok(Self::new(
            gateway,
            Arc::new(store),
            EventBus::new(),
            SessionSettings::from(config),
        ))
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Receiver<BookingEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn wizard(&self) -> Option<&WizardController> {
        self.wizard.as_ref()
    }

    pub fn booking(&self) -> Option<&BookingSnapshot> {
        self.wizard.as_ref().map(WizardController::booking)
    }

    pub fn state(&self) -> Option<BookingState> {
        self.wizard.as_ref().map(WizardController::state)
    }

    pub fn voucher_preview(&self) -> Option<&VoucherPreview> {
        self.preview.as_ref()
    }

    pub fn current_ticket(&self) -> Option<&SessionTicket> {
        self.tracker.current()
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Clears the expired latch after the user signed in again.
    pub fn renew(&mut self) {
        if self.expired {
            info!("session renewed");
        }
        self.expired = false;
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.wizard
            .as_ref()
            .map_or(false, WizardController::has_unsaved_changes)
    }

    /// History adjustments accumulated since the last call, oldest first.
    pub fn take_history_actions(&mut self) -> Vec<HistoryAction> {
        std::mem::take(&mut self.history)
    }

    // Opening and refreshing

    /// Makes `booking_id` the active booking. Responses for any earlier booking are stale from here on.
    pub fn begin_open(&mut self, booking_id: impl Into<BookingId>) -> SessionTicket {
        let ticket = self.tracker.begin(booking_id.into());
        self.reset_active();
        ticket
    }

    /// Installs the fetched booking and guests and resumes the wizard from stored progress.
    pub fn install(
        &mut self,
        ticket: &SessionTicket,
        booking: BookingSnapshot,
        guests: Vec<GuestRecord>,
    ) -> Applied<BookingState> {
        let Self {
            tracker,
            wizard,
            store,
            events,
            ..
        } = self;
        let applied = tracker.apply(ticket, || {
            let controller =
                WizardController::open(booking, guests, Arc::clone(store), events.clone());
            let state = controller.state();
            *wizard = Some(controller);
            state
        });
        if let Applied::Applied(state) = applied {
            info!(booking = %ticket.booking_id(), %state, "booking opened");
            self.sync_guard();
        }
        applied
    }

    /// Replaces the active snapshot. Publishes `BalanceChanged` when the amount due moved.
    pub fn apply_snapshot(
        &mut self,
        ticket: &SessionTicket,
        booking: BookingSnapshot,
    ) -> Applied<BookingState> {
        let Self {
            tracker,
            wizard,
            preview,
            events,
            ..
        } = self;
        let applied = tracker.apply(ticket, || {
            let controller = wizard.as_mut()?;
            let before = PricingReconciler::amount_due_in(
                controller.booking(),
                controller.state(),
                preview.as_ref(),
            );
            let state = controller.refresh(booking);
            let after =
                PricingReconciler::amount_due_in(controller.booking(), state, preview.as_ref());
            if (after - before).abs() > f64::EPSILON {
                events.publish(BookingEvent::BalanceChanged {
                    booking_id: controller.booking_id().clone(),
                    amount_due: after,
                });
            }
            Some(state)
        });
        match applied {
            Applied::Applied(Some(state)) => {
                self.sync_guard();
                Applied::Applied(state)
            }
            _ => Applied::Stale,
        }
    }

    pub fn apply_guests(&mut self, ticket: &SessionTicket, guests: Vec<GuestRecord>) -> Applied<()> {
        let Self {
            tracker, wizard, ..
        } = self;
        let applied = tracker.apply(ticket, || {
            wizard
                .as_mut()
                .map(|controller| controller.replace_guests(guests))
        });
        match applied {
            Applied::Applied(Some(())) => Applied::Applied(()),
            _ => Applied::Stale,
        }
    }

    pub fn apply_preview(&mut self, ticket: &SessionTicket, preview: VoucherPreview) -> Applied<()> {
        let Self {
            tracker,
            preview: slot,
            ..
        } = self;
        tracker.apply(ticket, || *slot = Some(preview))
    }

    /// Fetches and installs `booking_id`.
    pub fn open(&mut self, booking_id: impl Into<BookingId>) -> Result<BookingState> {
        let ticket = self.begin_open(booking_id);
        let booking = self.call(|gateway| gateway.fetch_booking(ticket.booking_id()))?;
        let guests = self.call(|gateway| gateway.fetch_guests(ticket.booking_id()))?;
        self.install(&ticket, booking, guests)
            .into_option()
            .ok_or(FlowError::NoActiveBooking)
    }

    pub fn refresh(&mut self) -> Result<BookingState> {
        let ticket = self.active_ticket()?;
        let booking = self.call(|gateway| gateway.fetch_booking(ticket.booking_id()))?;
        self.apply_snapshot(&ticket, booking)
            .into_option()
            .ok_or(FlowError::NoActiveBooking)
    }

    /// Refetches guests; staged edits are dropped in favour of the server list.
    pub fn reload_guests(&mut self) -> Result<()> {
        let ticket = self.active_ticket()?;
        let guests = self.call(|gateway| gateway.fetch_guests(ticket.booking_id()))?;
        self.apply_guests(&ticket, guests)
            .into_option()
            .ok_or(FlowError::NoActiveBooking)
    }

    pub fn change_status(
        &mut self,
        status: BookingState,
        message: Option<&str>,
    ) -> Result<BookingState> {
        let ticket = self.active_ticket()?;
        let booking =
            self.call(|gateway| gateway.change_status(ticket.booking_id(), status, message))?;
        info!(booking = %ticket.booking_id(), requested = %status, "booking status change sent");
        self.apply_snapshot(&ticket, booking)
            .into_option()
            .ok_or(FlowError::NoActiveBooking)
    }

    /// Drops the active booking. Any response still in flight is stale.
    pub fn close(&mut self) {
        self.tracker.end();
        self.reset_active();
    }

    // Wizard

    pub fn approve_step_one(&mut self) -> Result<StepOutcome> {
        let outcome = self.active_wizard()?.approve_step_one();
        self.settle(outcome)
    }

    pub fn stage_insurance(&mut self, guest_id: GuestId, status: InsuranceStatus) -> Result<()> {
        let outcome = self.active_wizard()?.stage_insurance(guest_id, status);
        self.settle(outcome)
    }

    pub fn approve_all_guests(&mut self) -> Result<()> {
        let outcome = self.active_wizard()?.approve_all_guests();
        self.settle(outcome)
    }

    /// Commits staged guest edits and advances to step 3 only when the commit succeeded.
    pub fn commit_step_two(&mut self) -> Result<StepOutcome> {
        self.ensure_live()?;
        let gateway = Arc::clone(&self.gateway);
        let outcome = self.active_wizard()?.commit_step_two(gateway.as_ref());
        self.settle(outcome)
    }

    pub fn back(&mut self) -> Result<StepOutcome> {
        let outcome = self.active_wizard()?.back();
        self.settle(outcome)
    }

    pub fn jump_to(&mut self, step: WizardStep) -> Result<StepOutcome> {
        let outcome = self.active_wizard()?.jump_to(step);
        self.settle(outcome)
    }

    // Navigation

    pub fn intercept(&mut self, attempt: NavigationAttempt) -> GuardDecision {
        let unsaved = self.has_unsaved_changes();
        self.guard.intercept(attempt, unsaved)
    }

    pub fn pending_navigation(&self) -> Option<&NavigationAttempt> {
        self.guard.pending()
    }

    /// Leaves the wizard, clearing its stored progress, and returns the deferred navigation.
    pub fn confirm_leave(&mut self) -> LeaveAction {
        let action = match self.wizard.as_mut() {
            Some(controller) => self.guard.confirm_leave(controller),
            None => {
                self.guard.cancel();
                LeaveAction::Exit
            }
        };
        self.sync_guard();
        action
    }

    pub fn cancel_leave(&mut self) {
        if let Some(action) = self.guard.cancel() {
            self.history.push(action);
        }
    }

    // Pricing

    /// Quotes `voucher_code` (or the booking's own voucher when `None`) and keeps the preview.
    pub fn preview_voucher(&mut self, voucher_code: Option<&str>) -> Result<VoucherPreview> {
        let ticket = self.active_ticket()?;
        let code = PricingReconciler::effective_voucher(self.current()?.booking(), voucher_code)
            .map(str::to_string);
        let preview =
            self.call(|gateway| gateway.preview_voucher(ticket.booking_id(), code.as_deref()))?;
        self.apply_preview(&ticket, preview.clone())
            .into_option()
            .ok_or(FlowError::NoActiveBooking)?;
        Ok(preview)
    }

    pub fn clear_voucher_preview(&mut self) {
        self.preview = None;
    }

    pub fn amount_due(&self) -> Result<Money> {
        let wizard = self.current()?;
        Ok(PricingReconciler::amount_due_in(
            wizard.booking(),
            wizard.state(),
            self.preview.as_ref(),
        ))
    }

    pub fn payment_breakdown(&self) -> Result<PaymentBreakdown> {
        let wizard = self.current()?;
        Ok(PricingReconciler::breakdown(
            wizard.booking(),
            self.preview.as_ref(),
        ))
    }

    pub fn is_deposit(&self, intent: Option<PaymentIntent>) -> Result<bool> {
        Ok(PricingReconciler::is_deposit(intent, self.current()?.state()))
    }

    // Completion

    pub fn company_confirm_completion(&mut self) -> Result<CompletionStatus> {
        self.confirm_completion("company", |gateway, booking_id| {
            gateway.company_confirm_completion(booking_id)
        })
    }

    pub fn user_confirm_completion(&mut self) -> Result<CompletionStatus> {
        self.confirm_completion("user", |gateway, booking_id| {
            gateway.user_confirm_completion(booking_id)
        })
    }

    pub fn tour_completion_status(&mut self) -> Result<bool> {
        let ticket = self.active_ticket()?;
        self.call(|gateway| gateway.tour_completion_status(ticket.booking_id()))
    }

    pub fn completion_status(&self) -> Result<CompletionStatus> {
        Ok(CompletionStatus::of(self.current()?.booking()))
    }

    /// Auto-confirm deadline for display; never drives any action.
    pub fn auto_confirm_date(&self) -> Option<NaiveDate> {
        self.booking().and_then(|booking| {
            auto_confirm_display_date(booking, self.settings.auto_confirm_fallback_days)
        })
    }

    /// Days left until [`BookingSession::auto_confirm_date`]; negative once it has passed.
    pub fn days_until_auto_confirm(&self) -> Option<i64> {
        self.booking().and_then(|booking| {
            days_until_auto_confirm(
                booking,
                self.settings.auto_confirm_fallback_days,
                self.clock.as_ref(),
            )
        })
    }

    fn confirm_completion(
        &mut self,
        party: &str,
        request: impl FnOnce(&dyn BookingGateway, &BookingId) -> StdResult<(), GatewayError>,
    ) -> Result<CompletionStatus> {
        let state = self.current()?.state();
        if !can_confirm_completion(state) {
            return Err(FlowError::InvalidState(state));
        }
        let ticket = self.active_ticket()?;
        self.call(|gateway| request(gateway, ticket.booking_id()))?;
        info!(booking = %ticket.booking_id(), party, "tour completion confirmed");
        self.refresh()?;
        self.completion_status()
    }

    // Plumbing

    fn current(&self) -> Result<&WizardController> {
        self.wizard.as_ref().ok_or(FlowError::NoActiveBooking)
    }

    fn active_wizard(&mut self) -> Result<&mut WizardController> {
        self.wizard.as_mut().ok_or(FlowError::NoActiveBooking)
    }

    fn active_ticket(&self) -> Result<SessionTicket> {
        if self.wizard.is_none() {
            return Err(FlowError::NoActiveBooking);
        }
        self.tracker
            .current()
            .cloned()
            .ok_or(FlowError::NoActiveBooking)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.expired {
            Err(FlowError::SessionExpired)
        } else {
            Ok(())
        }
    }

    /// Runs a collaborator request unless the session already expired.
    fn call<T>(
        &mut self,
        request: impl FnOnce(&dyn BookingGateway) -> StdResult<T, GatewayError>,
    ) -> Result<T> {
        self.ensure_live()?;
        let gateway = Arc::clone(&self.gateway);
        request(gateway.as_ref()).map_err(|err| self.fail(err.into()))
    }

    fn settle<T>(&mut self, outcome: StdResult<T, CoreError>) -> Result<T> {
        self.sync_guard();
        outcome.map_err(|err| self.fail(err.into()))
    }

    fn fail(&mut self, err: FlowError) -> FlowError {
        if matches!(err, FlowError::SessionExpired) {
            self.latch_expired();
        }
        err
    }

    fn latch_expired(&mut self) {
        if self.expired {
            return;
        }
        self.expired = true;
        warn!("session expired; requests are refused until renewed");
        self.events.publish(BookingEvent::SessionExpired);
    }

    fn reset_active(&mut self) {
        self.wizard = None;
        self.preview = None;
        self.guard.cancel();
        self.sync_guard();
    }

    fn sync_guard(&mut self) {
        let unsaved = self.has_unsaved_changes();
        if let Some(action) = self.guard.sync(unsaved) {
            debug!(?action, unsaved, "history sentinel updated");
            self.history.push(action);
        }
    }
}
