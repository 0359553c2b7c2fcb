//! Shared helpers for command handlers.

use std::io::IsTerminal;

use roster_core::{RecordId, RemoteCollection, Roster};

use crate::error::CliError;

/// Resolve a user-typed id against the loaded list.
///
/// `"7"` finds a record whether the server sent `7` or `"7"`.
pub fn resolve_student_id<R: RemoteCollection>(
    roster: &Roster<R>,
    identifier: &str,
) -> Result<RecordId, CliError> {
    roster
        .students_snapshot()
        .iter()
        .find(|s| s.id.matches(identifier))
        .map(|s| s.id.clone())
        .ok_or_else(|| CliError::NotFound {
            resource_type: "student".into(),
            identifier: identifier.into(),
            list_command: "students list".into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
