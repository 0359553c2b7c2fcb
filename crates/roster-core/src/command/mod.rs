// ── Command API ──
//
// Every user intent can be expressed as a `Command` and routed through
// `Roster::execute`. The UIs mostly call the typed methods directly; the
// enum exists for surfaces that queue or replay actions.

use strum::Display;

use crate::controller::{DeleteConfirmation, SubmitOutcome};
use crate::model::{DraftField, RecordId};

/// Kind of network request occupying the in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Operation {
    #[strum(to_string = "initial load")]
    Loading,
    #[strum(to_string = "refresh")]
    Refreshing,
    #[strum(to_string = "create")]
    Creating,
    #[strum(to_string = "update")]
    Updating,
    #[strum(to_string = "delete")]
    Deleting,
}

impl Operation {
    /// Present-participle label for progress indicators.
    pub fn progress_label(self) -> &'static str {
        match self {
            Self::Loading => "Loading students",
            Self::Refreshing => "Refreshing",
            Self::Creating => "Creating",
            Self::Updating => "Saving changes",
            Self::Deleting => "Deleting",
        }
    }

    /// Whether the request changes server state (and owns the form).
    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Creating | Self::Updating | Self::Deleting)
    }
}

/// All operations a user can trigger against the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Collection ───────────────────────────────────────────────────
    Refresh,

    // ── Form ─────────────────────────────────────────────────────────
    StartCreate,
    StartEdit { id: RecordId },
    UpdateField { field: DraftField, value: String },
    Submit,

    // ── Deletion ─────────────────────────────────────────────────────
    /// First step: ask for confirmation.
    RequestDelete { id: RecordId },
    ConfirmDelete,
    DeclineDelete,
    /// Delete without the confirmation step (already confirmed elsewhere).
    Delete { id: RecordId },
}

/// What a successfully executed command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    Refreshed { count: usize },
    Submitted(SubmitOutcome),
    DeleteRequested(DeleteConfirmation),
    Deleted { id: RecordId },
}
