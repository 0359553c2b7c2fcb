// ── Remote collection seam ──
//
// The controller only ever talks to the backend through `RemoteCollection`.
// `StudentsClient` is the production implementation; tests plug in a
// scripted double.

use std::future::Future;

use roster_api::{ResourceId, StudentBody, StudentsClient};

use crate::error::CoreError;
use crate::model::{FormDraft, RecordId, StudentRecord};

/// The four REST operations against the student resource.
pub trait RemoteCollection: Send + Sync + 'static {
    /// Every record, in server order.
    fn list(&self) -> impl Future<Output = Result<Vec<StudentRecord>, CoreError>> + Send;

    /// Persist a new record; the server assigns the id.
    fn create(
        &self,
        draft: &FormDraft,
    ) -> impl Future<Output = Result<StudentRecord, CoreError>> + Send;

    /// Replace the mutable fields of `id`. The server may or may not echo
    /// the record back.
    fn update(
        &self,
        id: &RecordId,
        draft: &FormDraft,
    ) -> impl Future<Output = Result<Option<StudentRecord>, CoreError>> + Send;

    fn delete(&self, id: &RecordId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl RemoteCollection for StudentsClient {
    async fn list(&self) -> Result<Vec<StudentRecord>, CoreError> {
        let students = self
            .list_students()
            .await
            .map_err(|e| CoreError::from_request(e, self.timeout(), None))?;
        Ok(students.into_iter().map(StudentRecord::from).collect())
    }

    async fn create(&self, draft: &FormDraft) -> Result<StudentRecord, CoreError> {
        let created = self
            .create_student(&StudentBody::from(draft))
            .await
            .map_err(|e| CoreError::from_request(e, self.timeout(), None))?;
        Ok(created.into())
    }

    async fn update(
        &self,
        id: &RecordId,
        draft: &FormDraft,
    ) -> Result<Option<StudentRecord>, CoreError> {
        let updated = self
            .update_student(&ResourceId::from(id), &StudentBody::from(draft))
            .await
            .map_err(|e| CoreError::from_request(e, self.timeout(), Some(id)))?;
        Ok(updated.map(StudentRecord::from))
    }

    async fn delete(&self, id: &RecordId) -> Result<(), CoreError> {
        self.delete_student(&ResourceId::from(id))
            .await
            .map_err(|e| CoreError::from_request(e, self.timeout(), Some(id)))
    }
}

// ── Scripted test double ─────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use tokio::sync::Semaphore;

    use super::*;

    /// A remote call as observed by the double.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        List,
        Create(FormDraft),
        Update(RecordId, FormDraft),
        Delete(RecordId),
    }

    /// Server state plus scripted failures.
    ///
    /// Successful calls mutate `records` the way a real backend would, so a
    /// refresh after a mutation sees the change. Queued failures are
    /// consumed first, one per call of the matching kind.
    #[derive(Default)]
    pub struct MockRemote {
        state: Mutex<MockState>,
        /// When set, every call waits for a permit before answering.
        gate: Option<Arc<Semaphore>>,
    }

    #[derive(Default)]
    struct MockState {
        records: Vec<StudentRecord>,
        next_id: i64,
        calls: Vec<Call>,
        list_failures: VecDeque<CoreError>,
        create_failures: VecDeque<CoreError>,
        update_failures: VecDeque<CoreError>,
        delete_failures: VecDeque<CoreError>,
    }

    pub fn record(id: i64, name: &str) -> StudentRecord {
        StudentRecord {
            id: RecordId::Number(id),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            major: String::new(),
            enrollment_date: String::new(),
        }
    }

    impl MockRemote {
        pub fn with_records(records: Vec<StudentRecord>) -> Self {
            let next_id = records
                .iter()
                .filter_map(|r| r.id.as_number())
                .max()
                .unwrap_or(0)
                + 1;
            Self {
                state: Mutex::new(MockState {
                    records,
                    next_id,
                    ..MockState::default()
                }),
                gate: None,
            }
        }

        /// Hold every call until `gate` hands out a permit.
        pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
            self.gate = Some(gate);
            self
        }

        pub fn fail_list(&self, err: CoreError) {
            self.state.lock().unwrap().list_failures.push_back(err);
        }

        pub fn fail_create(&self, err: CoreError) {
            self.state.lock().unwrap().create_failures.push_back(err);
        }

        pub fn fail_update(&self, err: CoreError) {
            self.state.lock().unwrap().update_failures.push_back(err);
        }

        pub fn fail_delete(&self, err: CoreError) {
            self.state.lock().unwrap().delete_failures.push_back(err);
        }

        /// Change server-side data behind the client's back.
        pub fn set_records(&self, records: Vec<StudentRecord>) {
            self.state.lock().unwrap().records = records;
        }

        pub fn calls(&self) -> Vec<Call> {
            self.state.lock().unwrap().calls.clone()
        }

        async fn wait(&self) {
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
        }
    }

    impl RemoteCollection for MockRemote {
        async fn list(&self) -> Result<Vec<StudentRecord>, CoreError> {
            self.wait().await;
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::List);
            if let Some(err) = state.list_failures.pop_front() {
                return Err(err);
            }
            Ok(state.records.clone())
        }

        async fn create(&self, draft: &FormDraft) -> Result<StudentRecord, CoreError> {
            self.wait().await;
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Create(draft.clone()));
            if let Some(err) = state.create_failures.pop_front() {
                return Err(err);
            }
            let record = StudentRecord {
                id: RecordId::Number(state.next_id),
                name: draft.name.clone(),
                email: draft.email.clone(),
                major: draft.major.clone(),
                enrollment_date: draft.enrollment_date.clone(),
            };
            state.next_id += 1;
            state.records.push(record.clone());
            Ok(record)
        }

        async fn update(
            &self,
            id: &RecordId,
            draft: &FormDraft,
        ) -> Result<Option<StudentRecord>, CoreError> {
            self.wait().await;
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Update(id.clone(), draft.clone()));
            if let Some(err) = state.update_failures.pop_front() {
                return Err(err);
            }
            let Some(existing) = state.records.iter_mut().find(|r| &r.id == id) else {
                return Err(CoreError::NotFound {
                    entity_type: "student".into(),
                    identifier: id.to_string(),
                });
            };
            existing.name.clone_from(&draft.name);
            existing.email.clone_from(&draft.email);
            existing.major.clone_from(&draft.major);
            existing.enrollment_date.clone_from(&draft.enrollment_date);
            Ok(None)
        }

        async fn delete(&self, id: &RecordId) -> Result<(), CoreError> {
            self.wait().await;
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Delete(id.clone()));
            if let Some(err) = state.delete_failures.pop_front() {
                return Err(err);
            }
            let before = state.records.len();
            state.records.retain(|r| &r.id != id);
            if state.records.len() == before {
                return Err(CoreError::NotFound {
                    entity_type: "student".into(),
                    identifier: id.to_string(),
                });
            }
            Ok(())
        }
    }
}
