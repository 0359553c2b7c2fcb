//! All possible UI actions. Actions are the sole mechanism for state mutation.

use roster_core::{
    DeleteConfirmation, DraftField, EditSession, LoadState, Operation, RecordId, RosterEvent,
    Snapshot,
};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Application lifecycle ─────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    ToggleHelp,

    // ── Data updates (from the data bridge) ───────────────────────
    StudentsUpdated(Snapshot),
    SessionChanged(EditSession),
    InFlightChanged(Option<Operation>),
    LoadStateChanged(LoadState),
    PendingDeleteChanged(Option<DeleteConfirmation>),
    Roster(RosterEvent),

    // ── Roster intents (from the screen) ──────────────────────────
    Refresh,
    StartCreate,
    StartEdit(RecordId),
    /// Keystrokes in the form. Applied to the controller's live draft,
    /// never to the screen's copy of it.
    InsertChar { field: DraftField, ch: char },
    DeleteChar { field: DraftField },
    Submit,
    RequestDelete(RecordId),
    ConfirmDelete,
    DeclineDelete,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
