// ── Wire ↔ domain conversions ──
//
// `roster_api` speaks wire types (`Student`, `StudentBody`, `ResourceId`);
// everything above this module speaks domain types.

use roster_api::{ResourceId, Student, StudentBody};

use crate::model::{FormDraft, RecordId, StudentRecord};

impl From<ResourceId> for RecordId {
    fn from(id: ResourceId) -> Self {
        match id {
            ResourceId::Number(n) => RecordId::Number(n),
            ResourceId::Text(s) => RecordId::Text(s),
        }
    }
}

impl From<&RecordId> for ResourceId {
    fn from(id: &RecordId) -> Self {
        match id {
            RecordId::Number(n) => ResourceId::Number(*n),
            RecordId::Text(s) => ResourceId::Text(s.clone()),
        }
    }
}

impl From<Student> for StudentRecord {
    fn from(s: Student) -> Self {
        StudentRecord {
            id: s.id.into(),
            name: s.name,
            email: s.email,
            major: s.major,
            enrollment_date: s.enrollment_date,
        }
    }
}

impl From<&FormDraft> for StudentBody {
    fn from(d: &FormDraft) -> Self {
        StudentBody {
            name: d.name.clone(),
            email: d.email.clone(),
            major: d.major.clone(),
            enrollment_date: d.enrollment_date.clone(),
        }
    }
}
