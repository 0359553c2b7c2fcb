// ── Edit session state machine ──
//
// Pure and synchronous: what the form holds and what a submit would do.
// The mode/target invariant is structural: a target exists iff the
// session is editing.

use crate::error::CoreError;
use crate::model::{DraftField, FormDraft, RecordId, StudentRecord};

/// Whether a submit creates a new record or updates an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Create,
    Edit { target: RecordId },
}

/// Form mode, edit target and the draft being typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    mode: EditMode,
    draft: FormDraft,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    /// The record a submit would update, if editing.
    pub fn target_id(&self) -> Option<&RecordId> {
        match &self.mode {
            EditMode::Create => None,
            EditMode::Edit { target } => Some(target),
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditMode::Edit { .. })
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Blank draft in Create mode. Calling it twice is the same as once.
    pub fn start_create(&mut self) {
        self.mode = EditMode::Create;
        self.draft = FormDraft::default();
    }

    /// Load `record` into the form and target it for update.
    pub fn start_edit(&mut self, record: &StudentRecord) {
        self.mode = EditMode::Edit {
            target: record.id.clone(),
        };
        self.draft = record.to_draft();
    }

    /// Overwrite one draft field; mode, target and the other fields stay.
    pub fn update_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.draft.set(field, value.into());
    }

    /// Like [`update_field`](Self::update_field), addressed by wire name.
    /// Unknown names change nothing.
    pub fn update_named_field(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        let field: DraftField = name.parse().map_err(|_| CoreError::UnknownField {
            name: name.to_owned(),
        })?;
        self.update_field(field, value);
        Ok(())
    }
}
