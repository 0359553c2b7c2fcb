// ── Student domain types ──
//
// `StudentRecord` is what the server has confirmed; `FormDraft` is what the
// user is typing. The draft never carries an id: identity lives in the
// edit session, not in the form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::record_id::RecordId;

/// Placeholder shown for empty optional fields.
pub const EMPTY_DISPLAY: &str = "-";

/// A persisted student, as last returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    /// Empty when the server omitted it.
    pub major: String,
    /// ISO calendar date (`YYYY-MM-DD`) as sent by the server; empty when absent.
    pub enrollment_date: String,
}

impl StudentRecord {
    /// Copy of the mutable fields, id excluded.
    pub fn to_draft(&self) -> FormDraft {
        FormDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            major: self.major.clone(),
            enrollment_date: self.enrollment_date.clone(),
        }
    }

    pub fn major_display(&self) -> &str {
        display_or_dash(&self.major)
    }

    pub fn enrollment_date_display(&self) -> &str {
        display_or_dash(&self.enrollment_date)
    }

    /// The enrollment date, if the server sent a well-formed ISO date.
    pub fn enrollment_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.enrollment_date.trim(), "%Y-%m-%d").ok()
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        EMPTY_DISPLAY
    } else {
        value
    }
}

// ── FormDraft ───────────────────────────────────────────────────────

/// The unsaved working copy of a record's mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    pub name: String,
    pub email: String,
    pub major: String,
    pub enrollment_date: String,
}

impl FormDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Email => &self.email,
            DraftField::Major => &self.major,
            DraftField::EnrollmentDate => &self.enrollment_date,
        }
    }

    /// Overwrite exactly one field.
    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::Name => self.name = value,
            DraftField::Email => self.email = value,
            DraftField::Major => self.major = value,
            DraftField::EnrollmentDate => self.enrollment_date = value,
        }
    }

    pub fn is_blank(&self) -> bool {
        DraftField::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// One editable field of the form. Parses from the wire/field names
/// `name`, `email`, `major`, `enrollmentDate`; nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum DraftField {
    #[strum(serialize = "name")]
    Name,
    #[strum(serialize = "email")]
    Email,
    #[strum(serialize = "major")]
    Major,
    #[strum(serialize = "enrollmentDate")]
    EnrollmentDate,
}

impl DraftField {
    /// All fields in form order.
    pub const ALL: [DraftField; 4] = [
        Self::Name,
        Self::Email,
        Self::Major,
        Self::EnrollmentDate,
    ];

    /// Human label for forms and prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Major => "Major",
            Self::EnrollmentDate => "Enrollment date",
        }
    }

    /// Input hint shown in empty fields.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "Jane Doe",
            Self::Email => "student@example.com",
            Self::Major => "Computer Science",
            Self::EnrollmentDate => "YYYY-MM-DD",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Major,
            Self::Major => Self::EnrollmentDate,
            Self::EnrollmentDate => Self::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Name => Self::EnrollmentDate,
            Self::Email => Self::Name,
            Self::Major => Self::Email,
            Self::EnrollmentDate => Self::Major,
        }
    }
}
