// roster-core: State reconciliation between roster-api and the UIs (CLI/TUI).

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod remote;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult, Operation};
pub use config::{RosterConfig, TlsVerification};
pub use controller::{DeleteConfirmation, LoadState, Roster, RosterEvent, SubmitOutcome};
pub use error::CoreError;
pub use remote::RemoteCollection;
pub use roster_api::DEFAULT_RESOURCE_PATH;
pub use session::{EditMode, EditSession};
pub use store::{CollectionStore, Snapshot};
pub use stream::EntityStream;

pub use model::{DraftField, EMPTY_DISPLAY, FormDraft, RecordId, StudentRecord};
