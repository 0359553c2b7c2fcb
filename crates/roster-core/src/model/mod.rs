// ── Domain model ──

pub mod record_id;
pub mod student;

pub use record_id::RecordId;
pub use student::{DraftField, EMPTY_DISPLAY, FormDraft, StudentRecord};
