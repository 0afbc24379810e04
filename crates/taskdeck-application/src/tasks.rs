//! Live task collection sync.
//!
//! Maintains a locally-cached view of the signed-in user's tasks,
//! kept consistent with the document store through a push
//! subscription, and exposes the create/update/delete operations.
//! The store is the sole source of truth: every snapshot replaces the
//! whole list, and mutations become visible only through the next
//! snapshot - there is no optimistic insert and no client-side merge.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;

use taskdeck_core::config::BackendConfig;
use taskdeck_core::error::{Result, TaskdeckError};
use taskdeck_core::task::{Document, DocumentQuery, DocumentStore, NewTask, QueryEvent, Task, TaskPatch};

/// The task list as exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskListState {
    /// Tasks from the latest snapshot, `createdAt` descending.
    pub tasks: Vec<Task>,
    /// True until the first snapshot for the current owner arrives
    /// (or until it is known there is no owner).
    pub loading: bool,
    /// Last subscription-level or decode failure. State alongside it
    /// is stale but present, never destructively cleared.
    pub error: Option<String>,
}

impl TaskListState {
    /// Initial state: nothing known yet, waiting on authentication.
    fn initial() -> Self {
        Self {
            tasks: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// State after sign-out: empty and settled.
    fn signed_out() -> Self {
        Self {
            tasks: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// The active subscription, if any.
struct SyncState {
    owner_id: Option<String>,
    pump: Option<JoinHandle<()>>,
}

/// Live, owner-scoped view of the task collection.
///
/// At most one subscription is active at a time. Switching or losing
/// the owner aborts the current snapshot pump before anything else
/// happens, so two subscriptions are never live concurrently, even
/// transiently.
pub struct TaskCollection {
    store: Arc<dyn DocumentStore>,
    collection: String,
    list_tx: Arc<watch::Sender<TaskListState>>,
    sync: Mutex<SyncState>,
}

impl TaskCollection {
    pub fn new(store: Arc<dyn DocumentStore>, config: &BackendConfig) -> Self {
        Self {
            store,
            collection: config.tasks_collection.clone(),
            list_tx: Arc::new(watch::channel(TaskListState::initial()).0),
            sync: Mutex::new(SyncState {
                owner_id: None,
                pump: None,
            }),
        }
    }

    /// Subscribes to task list changes.
    pub fn subscribe(&self) -> watch::Receiver<TaskListState> {
        self.list_tx.subscribe()
    }

    /// A point-in-time copy of the current task list state.
    pub fn state(&self) -> TaskListState {
        self.list_tx.borrow().clone()
    }

    /// Points the collection at a (possibly absent) owner.
    ///
    /// No-op when the owner is unchanged. Otherwise the current
    /// subscription is torn down first; `None` then clears the list,
    /// `Some` opens a fresh subscription and leaves the stale list in
    /// place until its first snapshot lands.
    pub async fn set_owner(&self, owner_id: Option<String>) -> Result<()> {
        let mut sync = self.sync.lock().await;
        if sync.owner_id == owner_id {
            return Ok(());
        }

        // Tear down before anything else; at most one pump alive.
        // Awaiting the aborted handle matters: a pump caught between
        // receiving an event and publishing it would otherwise race
        // the states sent below.
        if let Some(pump) = sync.pump.take() {
            pump.abort();
            let _ = pump.await;
        }
        sync.owner_id = owner_id.clone();

        let Some(owner) = owner_id else {
            tracing::debug!("owner gone, clearing task list");
            self.list_tx.send_replace(TaskListState::signed_out());
            return Ok(());
        };

        tracing::debug!(owner = %owner, "subscribing to task collection");
        self.list_tx.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let query = DocumentQuery::new(&self.collection, &owner);
        let events = match self.store.subscribe(query).await {
            Ok(events) => events,
            Err(err) => {
                self.list_tx.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(err.to_string());
                });
                return Err(err);
            }
        };
        sync.pump = Some(tokio::spawn(pump(events, self.list_tx.clone())));
        Ok(())
    }

    /// Creates a task owned by the current identity.
    ///
    /// Returns the assigned id. The task appears in the list only when
    /// the next snapshot arrives.
    pub async fn add_task(&self, new_task: NewTask) -> Result<String> {
        let owner = self.owner().await?;
        let fields = new_task.into_fields(&owner, Utc::now());
        let id = self.store.create(&self.collection, fields).await?;
        tracing::debug!(id = %id, "task created");
        Ok(id)
    }

    /// Applies a partial update. Untouched fields are left alone;
    /// `updatedAt` is always advanced.
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<()> {
        self.owner().await?;
        let fields = patch.into_fields(Utc::now());
        self.store.update(&self.collection, id, fields).await?;
        tracing::debug!(id = %id, "task updated");
        Ok(())
    }

    /// Deletes a task. Deleting an id the store no longer has is
    /// treated as success - the caller observes the outcome through
    /// snapshot omission either way.
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.owner().await?;
        match self.store.delete(&self.collection, id).await {
            Ok(()) => {
                tracing::debug!(id = %id, "task deleted");
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(id = %id, "task already gone");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn owner(&self) -> Result<String> {
        let sync = self.sync.lock().await;
        sync.owner_id.clone().ok_or(TaskdeckError::NotAuthenticated)
    }
}

impl Drop for TaskCollection {
    fn drop(&mut self) {
        if let Ok(mut sync) = self.sync.try_lock()
            && let Some(pump) = sync.pump.take()
        {
            pump.abort();
        }
    }
}

/// Applies subscription events to the task list, strictly in arrival
/// order. A snapshot replaces the whole list; a fault sets the error
/// and leaves the latest known list in place.
async fn pump(
    mut events: mpsc::UnboundedReceiver<QueryEvent>,
    list_tx: Arc<watch::Sender<TaskListState>>,
) {
    while let Some(event) = events.recv().await {
        match event {
            QueryEvent::Snapshot(documents) => {
                let decoded: Result<Vec<Task>> =
                    documents.iter().map(Document::decode).collect();
                list_tx.send_modify(|state| {
                    state.loading = false;
                    match decoded {
                        Ok(tasks) => {
                            state.tasks = tasks;
                            state.error = None;
                        }
                        Err(err) => state.error = Some(err.to_string()),
                    }
                });
            }
            QueryEvent::Error { message } => {
                tracing::debug!(error = %message, "subscription fault");
                list_tx.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex as StdMutex;
    use tokio::time::{Duration, timeout};

    /// Document store double that records calls and never pushes.
    #[derive(Default)]
    struct RecordingStore {
        calls: StdMutex<Vec<String>>,
        delete_result: StdMutex<Option<TaskdeckError>>,
        last_update: StdMutex<Option<Value>>,
        // held so subscriptions stay open without ever delivering
        senders: StdMutex<Vec<mpsc::UnboundedSender<QueryEvent>>>,
    }

    impl RecordingStore {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn subscribe(
            &self,
            _query: DocumentQuery,
        ) -> Result<mpsc::UnboundedReceiver<QueryEvent>> {
            self.record("subscribe");
            let (tx, rx) = mpsc::unbounded_channel();
            self.senders.lock().unwrap().push(tx);
            Ok(rx)
        }

        async fn create(&self, _collection: &str, _fields: Value) -> Result<String> {
            self.record("create");
            Ok("t-1".to_string())
        }

        async fn update(&self, _collection: &str, _id: &str, partial_fields: Value) -> Result<()> {
            self.record("update");
            *self.last_update.lock().unwrap() = Some(partial_fields);
            Ok(())
        }

        async fn delete(&self, _collection: &str, _id: &str) -> Result<()> {
            self.record("delete");
            match self.delete_result.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    fn collection(store: Arc<RecordingStore>) -> TaskCollection {
        TaskCollection::new(store, &BackendConfig::default())
    }

    fn task_document(id: &str, title: &str) -> Document {
        Document::new(
            id,
            json!({
                "ownerId": "u-1",
                "title": title,
                "status": "todo",
                "createdAt": "2024-03-01T12:00:00Z",
                "updatedAt": "2024-03-01T12:00:00Z",
            }),
        )
    }

    #[tokio::test]
    async fn test_mutations_without_owner_fail_and_skip_the_store() {
        let store = Arc::new(RecordingStore::default());
        let tasks = collection(store.clone());

        let added = tasks.add_task(NewTask::new("Buy milk")).await;
        assert_eq!(added.unwrap_err(), TaskdeckError::NotAuthenticated);
        let updated = tasks.update_task("t-1", TaskPatch::new().title("x")).await;
        assert_eq!(updated.unwrap_err(), TaskdeckError::NotAuthenticated);
        let deleted = tasks.delete_task("t-1").await;
        assert_eq!(deleted.unwrap_err(), TaskdeckError::NotAuthenticated);

        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_only_patched_fields_plus_updated_at() {
        let store = Arc::new(RecordingStore::default());
        let tasks = collection(store.clone());
        tasks.set_owner(Some("u-1".to_string())).await.unwrap();

        tasks
            .update_task("t-1", TaskPatch::new().title("Renamed"))
            .await
            .unwrap();

        let sent = store.last_update.lock().unwrap().clone().unwrap();
        let map = sent.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["title"], "Renamed");
        assert!(map.contains_key("updatedAt"));
    }

    #[tokio::test]
    async fn test_delete_swallows_not_found() {
        let store = Arc::new(RecordingStore::default());
        *store.delete_result.lock().unwrap() =
            Some(TaskdeckError::not_found("tasks", "ghost"));
        let tasks = collection(store.clone());
        tasks.set_owner(Some("u-1".to_string())).await.unwrap();

        assert!(tasks.delete_task("ghost").await.is_ok());

        // other failures still propagate
        *store.delete_result.lock().unwrap() =
            Some(TaskdeckError::permission_denied("not yours"));
        let denied = tasks.delete_task("t-2").await;
        assert!(matches!(denied, Err(TaskdeckError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_set_owner_is_idempotent_for_same_owner() {
        let store = Arc::new(RecordingStore::default());
        let tasks = collection(store.clone());

        tasks.set_owner(Some("u-1".to_string())).await.unwrap();
        tasks.set_owner(Some("u-1".to_string())).await.unwrap();
        assert_eq!(store.calls(), vec!["subscribe"]);
    }

    #[tokio::test]
    async fn test_undecodable_snapshot_sets_error_and_keeps_list() {
        let store = Arc::new(RecordingStore::default());
        let tasks = collection(store.clone());
        let mut rx = tasks.subscribe();
        tasks.set_owner(Some("u-1".to_string())).await.unwrap();
        let sender = store.senders.lock().unwrap().last().unwrap().clone();

        sender
            .send(QueryEvent::Snapshot(vec![task_document("t-1", "Buy milk")]))
            .unwrap();
        let state = timeout(
            Duration::from_secs(2),
            rx.wait_for(|state| !state.tasks.is_empty()),
        )
        .await
        .expect("timed out waiting for snapshot")
        .unwrap()
        .clone();
        assert!(state.error.is_none());

        // a snapshot the list cannot decode leaves the previous list
        // in place and surfaces the failure
        sender
            .send(QueryEvent::Snapshot(vec![Document::new(
                "t-2",
                json!({ "ownerId": "u-1" }),
            )]))
            .unwrap();
        let state = timeout(
            Duration::from_secs(2),
            rx.wait_for(|state| state.error.is_some()),
        )
        .await
        .expect("timed out waiting for decode failure")
        .unwrap()
        .clone();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].id, "t-1");
        assert!(!state.loading);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sign_out_wins_over_in_flight_snapshot() {
        let store = Arc::new(RecordingStore::default());
        let tasks = collection(store.clone());

        for round in 0..50 {
            tasks.set_owner(Some(format!("u-{round}"))).await.unwrap();
            let sender = store.senders.lock().unwrap().last().unwrap().clone();
            sender
                .send(QueryEvent::Snapshot(vec![task_document("t-1", "mine")]))
                .unwrap();
            tasks.set_owner(None).await.unwrap();

            // teardown finished before the clear was published, so the
            // snapshot can never land after it
            let state = tasks.state();
            assert!(state.tasks.is_empty(), "stale list after sign-out");
            assert!(!state.loading);
            tokio::task::yield_now().await;
            assert!(tasks.state().tasks.is_empty());
        }
    }

    #[tokio::test]
    async fn test_losing_owner_clears_list() {
        let store = Arc::new(RecordingStore::default());
        let tasks = collection(store.clone());
        tasks.set_owner(Some("u-1".to_string())).await.unwrap();

        tasks.set_owner(None).await.unwrap();
        let state = tasks.state();
        assert!(state.tasks.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
    }
}
