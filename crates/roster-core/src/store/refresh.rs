// ── Full refresh ──
//
// Fetch the whole list and swap it in. A failed fetch leaves the held
// collection exactly as it was.

use chrono::Utc;
use tracing::debug;

use super::CollectionStore;
use crate::error::CoreError;
use crate::model::StudentRecord;
use crate::remote::RemoteCollection;

impl CollectionStore {
    /// Replace the whole collection with `remote.list()`, in server order.
    /// Returns the new record count.
    pub async fn refresh<R: RemoteCollection>(&self, remote: &R) -> Result<usize, CoreError> {
        let records = remote.list().await?;
        Ok(self.apply_snapshot(records))
    }

    pub(crate) fn apply_snapshot(&self, records: Vec<StudentRecord>) -> usize {
        let count = records.len();
        self.students.replace_all(records);
        self.last_refresh.send_replace(Some(Utc::now()));
        debug!(count, "collection replaced");
        count
    }
}
