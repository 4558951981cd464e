//! Leave-confirmation for a wizard with unsaved progress.
//!
//! Platform hooks (unload, history back, link clicks) are fed in as
//! [`NavigationAttempt`]s. They all consult the same unsaved-changes signal and
//! share one pending slot, so at most one confirmation is open at a time.

use tracing::debug;
use tripflow_domain::BookingState;

use crate::wizard_controller::{WizardController, WizardMode};

/// Pure form of the unsaved-changes signal.
pub fn has_unsaved_changes(mode: WizardMode, completed_steps: usize, state: BookingState) -> bool {
    mode == WizardMode::Active && completed_steps > 0 && state != BookingState::BookingSuccess
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub origin: String,
    pub path: String,
}

impl LinkTarget {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAttempt {
    Unload,
    HistoryBack,
    Link(LinkTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    /// Let the platform show its generic leave prompt.
    ConfirmUnload,
    /// Show the confirmation modal; the attempt is held until resolved.
    Prompt,
    /// Another attempt is already waiting on the modal; this one is dropped.
    AlreadyPending,
}

/// Adjustments the history adapter must make to its synthetic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    PushSentinel,
    ReleaseSentinel,
}

/// What to do once the user confirmed leaving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveAction {
    GoBack,
    Follow(LinkTarget),
    Exit,
}

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    app_origin: String,
    wizard_path: String,
    pending: Option<NavigationAttempt>,
    sentinel_armed: bool,
}

impl NavigationGuard {
    pub fn new(app_origin: impl Into<String>, wizard_path: impl Into<String>) -> Self {
        Self {
            app_origin: normalize_origin(&app_origin.into()),
            wizard_path: wizard_path.into(),
            pending: None,
            sentinel_armed: false,
        }
    }

    pub fn pending(&self) -> Option<&NavigationAttempt> {
        self.pending.as_ref()
    }

    pub fn is_sentinel_armed(&self) -> bool {
        self.sentinel_armed
    }

    /// Keeps the synthetic history entry in line with the signal.
    pub fn sync(&mut self, unsaved: bool) -> Option<HistoryAction> {
        match (unsaved, self.sentinel_armed) {
            (true, false) => {
                self.sentinel_armed = true;
                Some(HistoryAction::PushSentinel)
            }
            (false, true) => {
                self.sentinel_armed = false;
                Some(HistoryAction::ReleaseSentinel)
            }
            _ => None,
        }
    }

    pub fn intercept(&mut self, attempt: NavigationAttempt, unsaved: bool) -> GuardDecision {
        if !unsaved {
            return GuardDecision::Proceed;
        }
        let decision = match &attempt {
            NavigationAttempt::Unload => GuardDecision::ConfirmUnload,
            NavigationAttempt::Link(target) if !self.guards_link(target) => GuardDecision::Proceed,
            _ if self.pending.is_some() => GuardDecision::AlreadyPending,
            _ => {
                self.pending = Some(attempt.clone());
                GuardDecision::Prompt
            }
        };
        debug!(?attempt, ?decision, "navigation intercepted");
        decision
    }

    /// Leaves the wizard: clears its progress and staged edits, then hands back
    /// the navigation that was deferred.
    ///
    /// A confirmed back press already consumed the synthetic entry. For any other
    /// leave the sentinel stays armed, so the next [`NavigationGuard::sync`] returns
    /// [`HistoryAction::ReleaseSentinel`].
    pub fn confirm_leave(&mut self, controller: &mut WizardController) -> LeaveAction {
        controller.abandon();
        match self.pending.take() {
            Some(NavigationAttempt::HistoryBack) => {
                self.sentinel_armed = false;
                LeaveAction::GoBack
            }
            Some(NavigationAttempt::Link(target)) => LeaveAction::Follow(target),
            Some(NavigationAttempt::Unload) | None => LeaveAction::Exit,
        }
    }

    /// Stays on the current step. A cancelled back press consumed the synthetic
    /// entry, so the adapter has to push it again.
    pub fn cancel(&mut self) -> Option<HistoryAction> {
        match self.pending.take() {
            Some(NavigationAttempt::HistoryBack) if self.sentinel_armed => {
                Some(HistoryAction::PushSentinel)
            }
            _ => None,
        }
    }

    fn guards_link(&self, target: &LinkTarget) -> bool {
        normalize_origin(&target.origin) == self.app_origin && !self.is_wizard_path(&target.path)
    }

    /// `path` is the wizard route itself or one of its sub-paths; `/bookings` is not under `/booking`.
    fn is_wizard_path(&self, path: &str) -> bool {
        match path.strip_prefix(self.wizard_path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.wizard_path.ends_with('/'),
            None => false,
        }
    }
}

fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}
