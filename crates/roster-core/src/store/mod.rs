// ── Collection store ──
//
// The local authoritative cache of student records. Rebuilt from the
// server on every refresh, never patched.

mod collection;
mod refresh;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{RecordId, StudentRecord};
use crate::stream::EntityStream;

use self::collection::EntityCollection;

/// Immutable view of the collection at one instant.
pub type Snapshot = Arc<Vec<Arc<StudentRecord>>>;

/// Holds the current student list and when it was last fetched.
pub struct CollectionStore {
    students: EntityCollection<StudentRecord>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl CollectionStore {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            students: EntityCollection::new(),
            last_refresh,
        }
    }

    /// Snapshot for rendering.
    pub fn current(&self) -> Snapshot {
        self.students.snapshot()
    }

    pub fn get(&self, id: &RecordId) -> Option<Arc<StudentRecord>> {
        self.students.find(|s| &s.id == id)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of replacements applied so far.
    pub fn version(&self) -> u64 {
        self.students.version()
    }

    pub fn subscribe(&self) -> EntityStream<StudentRecord> {
        EntityStream::new(self.students.subscribe())
    }

    /// Time of the last successful replace.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}
