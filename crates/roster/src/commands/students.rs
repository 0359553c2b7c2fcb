//! Student command handlers.
//!
//! `add` and `edit` go through the same session path as the TUI form:
//! start a session, fill fields, submit.

use std::sync::Arc;

use tabled::Tabled;

use roster_core::{DraftField, RemoteCollection, Roster, StudentRecord, SubmitOutcome};

use crate::cli::{GlobalOpts, StudentFields, StudentsArgs, StudentsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Major")]
    major: String,
    #[tabled(rename = "Enrolled")]
    enrolled: String,
}

impl From<&Arc<StudentRecord>> for StudentRow {
    fn from(s: &Arc<StudentRecord>) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            email: s.email.clone(),
            major: s.major_display().to_owned(),
            enrolled: s.enrollment_date_display().to_owned(),
        }
    }
}

fn detail(s: &StudentRecord) -> String {
    [
        format!("ID:       {}", s.id),
        format!("Name:     {}", s.name),
        format!("Email:    {}", s.email),
        format!("Major:    {}", s.major_display()),
        format!("Enrolled: {}", s.enrollment_date_display()),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<R: RemoteCollection>(
    roster: &Roster<R>,
    args: StudentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        StudentsCommand::List => {
            roster.load().await?;
            let snap = roster.students_snapshot();
            if snap.is_empty() && matches!(global.output, crate::cli::OutputFormat::Table) {
                output::print_hint(
                    "No students yet. Add one with: roster students add --name <NAME> --email <EMAIL>",
                    &global.color,
                    global.quiet,
                );
                return Ok(());
            }
            let out = output::render_list(
                &global.output,
                &snap,
                |s| StudentRow::from(s),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StudentsCommand::Get { id } => {
            roster.load().await?;
            let id = util::resolve_student_id(roster, &id)?;
            let record = roster.store().get(&id).ok_or_else(|| CliError::NotFound {
                resource_type: "student".into(),
                identifier: id.to_string(),
                list_command: "students list".into(),
            })?;
            let out = output::render_single(
                &global.output,
                record.as_ref(),
                detail,
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StudentsCommand::Add { fields } => {
            for (field, value) in [
                (DraftField::Name, &fields.name),
                (DraftField::Email, &fields.email),
            ] {
                if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                    return Err(CliError::Validation {
                        field: field.to_string(),
                        reason: format!("--{} is required", field.label().to_lowercase()),
                    });
                }
            }

            roster.start_create()?;
            fill(roster, &fields)?;
            let outcome = roster.submit().await?;
            report(roster, &outcome, global);
            Ok(())
        }

        StudentsCommand::Edit { id, fields } => {
            if fields.is_empty() {
                return Err(CliError::Validation {
                    field: "fields".into(),
                    reason: "nothing to change; pass at least one of --name, --email, \
                             --major, --enrollment-date"
                        .into(),
                });
            }

            roster.load().await?;
            let id = util::resolve_student_id(roster, &id)?;
            roster.start_edit(&id)?;
            fill(roster, &fields)?;
            let outcome = roster.submit().await?;
            report(roster, &outcome, global);
            Ok(())
        }

        StudentsCommand::Delete { id } => {
            roster.load().await?;
            let id = util::resolve_student_id(roster, &id)?;
            let pending = roster.request_delete(&id)?;

            if !util::confirm(
                &format!("Delete student '{}' (id {})?", pending.name, pending.id),
                "students delete",
                global.yes,
            )? {
                roster.decline_delete();
                output::print_hint("Aborted.", &global.color, global.quiet);
                return Ok(());
            }

            let deleted = roster.confirm_delete().await?;
            output::print_success(
                &format!("Student {deleted} deleted"),
                &global.color,
                global.quiet,
            );
            Ok(())
        }
    }
}

/// Copy the flags that were given into the session draft.
fn fill<R: RemoteCollection>(roster: &Roster<R>, fields: &StudentFields) -> Result<(), CliError> {
    let given = [
        (DraftField::Name, &fields.name),
        (DraftField::Email, &fields.email),
        (DraftField::Major, &fields.major),
        (DraftField::EnrollmentDate, &fields.enrollment_date),
    ];
    for (field, value) in given {
        if let Some(value) = value {
            roster.update_field(field, value.clone())?;
        }
    }
    Ok(())
}

fn report<R: RemoteCollection>(roster: &Roster<R>, outcome: &SubmitOutcome, global: &GlobalOpts) {
    let (message, record) = match outcome {
        SubmitOutcome::Created(record) => (
            format!("Student created (id {})", record.id),
            Some(Arc::new(record.clone())),
        ),
        SubmitOutcome::Updated { id, record } => (
            format!("Student {id} updated"),
            roster
                .store()
                .get(id)
                .or_else(|| record.clone().map(Arc::new)),
        ),
    };

    output::print_success(&message, &global.color, global.quiet);
    if let Some(record) = record {
        let out = output::render_single(&global.output, record.as_ref(), detail, |s| {
            s.id.to_string()
        });
        output::print_output(&out, global.quiet);
    }
}
