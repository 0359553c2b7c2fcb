// ── Generic reactive entity collection ──
//
// Ordered snapshot storage with push-based change notification via
// `watch` channels. Contents are only ever replaced wholesale.

use std::sync::Arc;

use tokio::sync::watch;

/// A reactive, ordered collection for a single entity type.
///
/// Every replace bumps a version counter and publishes a fresh immutable
/// snapshot to subscribers. Readers never observe a partially built list.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot in insertion order.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { version, snapshot }
    }

    /// Replace every entity, keeping the given order.
    pub(crate) fn replace_all(&self, items: Vec<T>) {
        let values: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    /// First entity matching `pred` in the current snapshot.
    pub(crate) fn find(&self, pred: impl Fn(&T) -> bool) -> Option<Arc<T>> {
        self.snapshot.borrow().iter().find(|e| pred(e)).cloned()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn replace_keeps_order() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all(vec!["b".into(), "a".into(), "c".into()]);
        let snap = col.snapshot();
        let names: Vec<&str> = snap.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn replace_never_merges() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all(vec!["x".into(), "y".into()]);
        col.replace_all(vec!["z".into()]);
        assert_eq!(col.len(), 1);
        assert_eq!(*col.find(|s| s == "z").unwrap(), "z");
        assert!(col.find(|s| s == "x").is_none());
    }

    #[test]
    fn every_replace_bumps_version() {
        let col: EntityCollection<u32> = EntityCollection::new();
        assert_eq!(col.version(), 0);
        col.replace_all(vec![1]);
        col.replace_all(vec![1]);
        assert_eq!(col.version(), 2);
    }

    #[test]
    fn old_snapshots_are_immutable() {
        let col: EntityCollection<u32> = EntityCollection::new();
        col.replace_all(vec![1, 2]);
        let held = col.snapshot();
        col.replace_all(vec![3]);
        assert_eq!(held.len(), 2);
        assert_eq!(col.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let col: EntityCollection<u32> = EntityCollection::new();
        let mut rx = col.subscribe();
        col.replace_all(vec![7]);
        rx.changed().await.unwrap();
        assert_eq!(**rx.borrow_and_update().first().unwrap(), 7);
    }
}
