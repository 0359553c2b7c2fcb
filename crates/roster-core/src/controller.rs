// ── Roster controller ──
//
// Single owner of the collection store, the edit session and the remote.
// Coordinates submits and deletes so that the form, its mode and the list
// only ever change together, and only after the server has confirmed.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::command::{Command, CommandResult, Operation};
use crate::config::RosterConfig;
use crate::error::CoreError;
use crate::model::{DraftField, RecordId, StudentRecord};
use crate::remote::RemoteCollection;
use crate::session::{EditMode, EditSession};
use crate::store::{CollectionStore, Snapshot};
use crate::stream::EntityStream;

use roster_api::StudentsClient;

const EVENT_CHANNEL_SIZE: usize = 64;

// ── Observable state ─────────────────────────────────────────────

/// Progress of the initial list load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed { message: String },
}

/// A delete awaiting the user's yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: RecordId,
    /// Display name of the record, for the prompt.
    pub name: String,
}

/// What a successful submit did on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(StudentRecord),
    /// `record` is the server's echo, when it sent one.
    Updated {
        id: RecordId,
        record: Option<StudentRecord>,
    },
}

/// Notifications broadcast to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    Loaded { count: usize },
    Refreshed { count: usize },
    Created { record: StudentRecord },
    Updated { id: RecordId },
    Deleted { id: RecordId },
    DeleteRequested(DeleteConfirmation),
    DeleteDeclined { id: RecordId },
    Failed { operation: Operation, message: String },
}

// ── Roster ───────────────────────────────────────────────────────

/// The main entry point for the UIs.
///
/// Cheaply cloneable via `Arc<RosterInner>`, so UI tasks can await an
/// operation without blocking rendering. At most one network request is
/// outstanding at a time; see [`CoreError::Busy`].
pub struct Roster<R: RemoteCollection> {
    inner: Arc<RosterInner<R>>,
}

impl<R: RemoteCollection> Clone for Roster<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct RosterInner<R> {
    remote: R,
    store: CollectionStore,
    session: watch::Sender<EditSession>,
    in_flight: watch::Sender<Option<Operation>>,
    load_state: watch::Sender<LoadState>,
    pending_delete: watch::Sender<Option<DeleteConfirmation>>,
    event_tx: broadcast::Sender<RosterEvent>,
}

impl Roster<StudentsClient> {
    /// Build a roster talking HTTP to the configured server.
    pub fn from_config(config: &RosterConfig) -> Result<Self, CoreError> {
        let client =
            StudentsClient::new(&config.base_url, &config.resource_path, &config.transport())?;
        Ok(Self::new(client))
    }
}

impl<R: RemoteCollection> Roster<R> {
    /// Create a roster over `remote`. Nothing is fetched until
    /// [`load()`](Self::load).
    pub fn new(remote: R) -> Self {
        let (session, _) = watch::channel(EditSession::new());
        let (in_flight, _) = watch::channel(None);
        let (load_state, _) = watch::channel(LoadState::Idle);
        let (pending_delete, _) = watch::channel(None);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Self {
            inner: Arc::new(RosterInner {
                remote,
                store: CollectionStore::new(),
                session,
                in_flight,
                load_state,
                pending_delete,
                event_tx,
            }),
        }
    }

    pub fn remote(&self) -> &R {
        &self.inner.remote
    }

    pub fn store(&self) -> &CollectionStore {
        &self.inner.store
    }

    // ── Collection ───────────────────────────────────────────────

    /// Initial list load. On failure the collection stays empty and the
    /// load state leaves `Loading` for `Failed`.
    pub async fn load(&self) -> Result<usize, CoreError> {
        let _guard = self.begin(Operation::Loading)?;
        self.inner.load_state.send_replace(LoadState::Loading);

        match self.inner.store.refresh(&self.inner.remote).await {
            Ok(count) => {
                self.inner.load_state.send_replace(LoadState::Loaded);
                info!(count, "students loaded");
                self.emit(RosterEvent::Loaded { count });
                Ok(count)
            }
            Err(e) => {
                self.inner.load_state.send_replace(LoadState::Failed {
                    message: e.to_string(),
                });
                self.report_failure(Operation::Loading, &e);
                Err(e)
            }
        }
    }

    /// User-requested refresh.
    pub async fn refresh(&self) -> Result<usize, CoreError> {
        let _guard = self.begin(Operation::Refreshing)?;
        match self.inner.store.refresh(&self.inner.remote).await {
            Ok(count) => {
                self.mark_loaded();
                self.emit(RosterEvent::Refreshed { count });
                Ok(count)
            }
            Err(e) => {
                self.report_failure(Operation::Refreshing, &e);
                Err(e)
            }
        }
    }

    // ── Edit session ─────────────────────────────────────────────

    /// Blank form in Create mode (also "cancel edit").
    pub fn start_create(&self) -> Result<(), CoreError> {
        self.ensure_form_free("reset the form")?;
        self.inner.session.send_if_modified(|s| {
            let before = s.clone();
            s.start_create();
            *s != before
        });
        Ok(())
    }

    /// Load the record `id` from the current list into the form.
    pub fn start_edit(&self, id: &RecordId) -> Result<(), CoreError> {
        self.ensure_form_free("edit a student")?;
        let record = self.lookup(id)?;
        self.inner.session.send_modify(|s| s.start_edit(&record));
        debug!(%id, "editing student");
        Ok(())
    }

    pub fn update_field(&self, field: DraftField, value: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_form_free("change the form")?;
        let value = value.into();
        self.inner.session.send_modify(|s| s.update_field(field, value));
        Ok(())
    }

    /// Update a field addressed by its wire name (`enrollmentDate`, ...).
    pub fn update_named_field(&self, name: &str, value: impl Into<String>) -> Result<(), CoreError> {
        let field: DraftField = name.parse().map_err(|_| CoreError::UnknownField {
            name: name.to_owned(),
        })?;
        self.update_field(field, value)
    }

    /// Current session (mode, target, draft).
    pub fn session(&self) -> EditSession {
        self.inner.session.borrow().clone()
    }

    // ── Submission ───────────────────────────────────────────────

    /// Send the draft: `update` when editing, `create` otherwise.
    ///
    /// On success the list is refreshed and the form returns to a blank
    /// Create session. On failure nothing local changes.
    pub async fn submit(&self) -> Result<SubmitOutcome, CoreError> {
        let op = if self.inner.session.borrow().is_editing() {
            Operation::Updating
        } else {
            Operation::Creating
        };
        let guard = self.begin(op)?;
        let session = self.session();

        let result = match session.mode() {
            EditMode::Create => self
                .inner
                .remote
                .create(session.draft())
                .await
                .map(SubmitOutcome::Created),
            EditMode::Edit { target } => self
                .inner
                .remote
                .update(target, session.draft())
                .await
                .map(|record| SubmitOutcome::Updated {
                    id: target.clone(),
                    record,
                }),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report_failure(op, &e);
                return Err(e);
            }
        };

        self.refresh_after_mutation().await;
        self.inner.session.send_modify(EditSession::start_create);
        drop(guard);

        match &outcome {
            SubmitOutcome::Created(record) => {
                info!(id = %record.id, "student created");
                self.emit(RosterEvent::Created {
                    record: record.clone(),
                });
            }
            SubmitOutcome::Updated { id, .. } => {
                info!(%id, "student updated");
                self.emit(RosterEvent::Updated { id: id.clone() });
            }
        }
        Ok(outcome)
    }

    // ── Deletion ─────────────────────────────────────────────────

    /// Delete `id` on the server, then refresh. If the form was editing
    /// that record it returns to a blank Create session.
    pub async fn delete_record(&self, id: &RecordId) -> Result<(), CoreError> {
        let guard = self.begin(Operation::Deleting)?;
        self.inner
            .pending_delete
            .send_if_modified(|p| take_if_matches(p, id));

        if let Err(e) = self.inner.remote.delete(id).await {
            self.report_failure(Operation::Deleting, &e);
            return Err(e);
        }

        self.refresh_after_mutation().await;
        self.inner.session.send_if_modified(|s| {
            if s.target_id() == Some(id) {
                s.start_create();
                true
            } else {
                false
            }
        });
        drop(guard);

        info!(%id, "student deleted");
        self.emit(RosterEvent::Deleted { id: id.clone() });
        Ok(())
    }

    /// First step of a delete: record what is awaiting confirmation.
    /// Replaces any earlier pending request.
    pub fn request_delete(&self, id: &RecordId) -> Result<DeleteConfirmation, CoreError> {
        self.ensure_idle("delete a student")?;
        let record = self.lookup(id)?;
        let confirmation = DeleteConfirmation {
            id: record.id.clone(),
            name: record.name.clone(),
        };
        self.inner
            .pending_delete
            .send_replace(Some(confirmation.clone()));
        self.emit(RosterEvent::DeleteRequested(confirmation.clone()));
        Ok(confirmation)
    }

    /// Second step: the user said yes.
    pub async fn confirm_delete(&self) -> Result<RecordId, CoreError> {
        let id = self
            .inner
            .pending_delete
            .borrow()
            .as_ref()
            .map(|c| c.id.clone())
            .ok_or(CoreError::NoPendingDelete)?;
        self.delete_record(&id).await?;
        Ok(id)
    }

    /// Second step: the user said no. Returns what was discarded.
    pub fn decline_delete(&self) -> Option<DeleteConfirmation> {
        let declined = self.inner.pending_delete.send_replace(None)?;
        debug!(id = %declined.id, "delete declined");
        self.emit(RosterEvent::DeleteDeclined {
            id: declined.id.clone(),
        });
        Some(declined)
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command, routing it to the matching typed method.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        match cmd {
            Command::Refresh => {
                let count = self.refresh().await?;
                Ok(CommandResult::Refreshed { count })
            }
            Command::StartCreate => self.start_create().map(|()| CommandResult::Ok),
            Command::StartEdit { id } => self.start_edit(&id).map(|()| CommandResult::Ok),
            Command::UpdateField { field, value } => {
                self.update_field(field, value).map(|()| CommandResult::Ok)
            }
            Command::Submit => self.submit().await.map(CommandResult::Submitted),
            Command::RequestDelete { id } => {
                self.request_delete(&id).map(CommandResult::DeleteRequested)
            }
            Command::ConfirmDelete => {
                let id = self.confirm_delete().await?;
                Ok(CommandResult::Deleted { id })
            }
            Command::DeclineDelete => {
                self.decline_delete();
                Ok(CommandResult::Ok)
            }
            Command::Delete { id } => {
                self.delete_record(&id).await?;
                Ok(CommandResult::Deleted { id })
            }
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Reactive stream of collection snapshots.
    pub fn students(&self) -> EntityStream<StudentRecord> {
        self.inner.store.subscribe()
    }

    pub fn students_snapshot(&self) -> Snapshot {
        self.inner.store.current()
    }

    pub fn session_changes(&self) -> watch::Receiver<EditSession> {
        self.inner.session.subscribe()
    }

    /// The operation currently holding the in-flight slot, if any.
    pub fn in_flight(&self) -> watch::Receiver<Option<Operation>> {
        self.inner.in_flight.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.borrow().is_some()
    }

    pub fn load_state(&self) -> watch::Receiver<LoadState> {
        self.inner.load_state.subscribe()
    }

    pub fn pending_delete(&self) -> watch::Receiver<Option<DeleteConfirmation>> {
        self.inner.pending_delete.subscribe()
    }

    /// Subscribe to the event broadcast stream.
    pub fn events(&self) -> broadcast::Receiver<RosterEvent> {
        self.inner.event_tx.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────

    /// Claim the in-flight slot, or fail with `Busy` if it is taken.
    fn begin(&self, op: Operation) -> Result<InFlight<'_>, CoreError> {
        let mut active = None;
        self.inner.in_flight.send_if_modified(|slot| {
            if let Some(current) = *slot {
                active = Some(current);
                false
            } else {
                *slot = Some(op);
                true
            }
        });
        if let Some(active) = active {
            debug!(requested = %op, %active, "rejected: request in flight");
            return Err(CoreError::Busy {
                action: op_action(op),
                active,
            });
        }
        Ok(InFlight {
            slot: &self.inner.in_flight,
        })
    }

    fn ensure_idle(&self, action: &'static str) -> Result<(), CoreError> {
        match *self.inner.in_flight.borrow() {
            Some(active) => Err(CoreError::Busy { action, active }),
            None => Ok(()),
        }
    }

    /// Loads and refreshes never read the session, so the form stays
    /// editable under them. A submit or delete owns it until its follow-up
    /// refresh has finished.
    fn ensure_form_free(&self, action: &'static str) -> Result<(), CoreError> {
        match *self.inner.in_flight.borrow() {
            Some(active) if active.is_mutation() => Err(CoreError::Busy { action, active }),
            _ => Ok(()),
        }
    }

    fn lookup(&self, id: &RecordId) -> Result<Arc<StudentRecord>, CoreError> {
        self.inner
            .store
            .get(id)
            .ok_or_else(|| CoreError::NotInCollection { id: id.to_string() })
    }

    /// Refresh after a confirmed mutation. A failure here is reported but
    /// does not undo the mutation.
    async fn refresh_after_mutation(&self) {
        match self.inner.store.refresh(&self.inner.remote).await {
            Ok(count) => {
                self.mark_loaded();
                self.emit(RosterEvent::Refreshed { count });
            }
            Err(e) => self.report_failure(Operation::Refreshing, &e),
        }
    }

    fn mark_loaded(&self) {
        self.inner.load_state.send_if_modified(|s| {
            if *s == LoadState::Loaded {
                false
            } else {
                *s = LoadState::Loaded;
                true
            }
        });
    }

    fn report_failure(&self, operation: Operation, err: &CoreError) {
        warn!(%operation, error = %err, "request failed");
        self.emit(RosterEvent::Failed {
            operation,
            message: err.to_string(),
        });
    }

    fn emit(&self, event: RosterEvent) {
        // No subscribers is fine.
        let _ = self.inner.event_tx.send(event);
    }
}

fn op_action(op: Operation) -> &'static str {
    match op {
        Operation::Loading => "load students",
        Operation::Refreshing => "refresh",
        Operation::Creating | Operation::Updating => "submit",
        Operation::Deleting => "delete a student",
    }
}

fn take_if_matches(pending: &mut Option<DeleteConfirmation>, id: &RecordId) -> bool {
    if pending.as_ref().is_some_and(|c| &c.id == id) {
        *pending = None;
        true
    } else {
        false
    }
}

// ── In-flight guard ──────────────────────────────────────────────

/// Holds the in-flight slot; releases it on drop, success or failure.
struct InFlight<'a> {
    slot: &'a watch::Sender<Option<Operation>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.slot.send_replace(None);
    }
}
