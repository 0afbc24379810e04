//! In-memory document store implementation.
//!
//! A process-local stand-in for the managed document database. It
//! keeps documents as JSON objects per collection, supports live
//! queries that push complete snapshots on every mutation, and merges
//! partial updates the way the managed store does.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use taskdeck_core::error::{Result, TaskdeckError};
use taskdeck_core::task::{Document, DocumentQuery, DocumentStore, QueryEvent};

/// A live query subscriber.
struct Watcher {
    query: DocumentQuery,
    tx: mpsc::UnboundedSender<QueryEvent>,
}

#[derive(Default)]
struct Inner {
    /// collection name -> document id -> fields.
    collections: HashMap<String, BTreeMap<String, Value>>,
    watchers: Vec<Watcher>,
    unavailable: bool,
}

/// In-memory implementation of [`DocumentStore`].
///
/// All mutations and snapshot pushes happen under one lock, so every
/// subscriber sees snapshots in mutation order. Snapshots are complete
/// result sets: owner-filtered and ordered by `createdAt` descending.
pub struct MemoryDocumentStore {
    inner: Mutex<Inner>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Makes every subsequent call fail with `BackendUnavailable`.
    /// Existing subscriptions stay open; tests use [`Self::fail_subscriptions`]
    /// to exercise the degraded snapshot path.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().await.unavailable = unavailable;
    }

    /// Pushes a subscription-level error to every open subscription.
    pub async fn fail_subscriptions(&self, message: &str) {
        let mut inner = self.inner.lock().await;
        inner.watchers.retain(|watcher| {
            watcher
                .tx
                .send(QueryEvent::Error {
                    message: message.to_string(),
                })
                .is_ok()
        });
    }

    /// Number of currently open subscriptions.
    pub async fn subscription_count(&self) -> usize {
        let mut inner = self.inner.lock().await;
        inner
            .watchers
            .retain(|watcher| !watcher.tx.is_closed());
        inner.watchers.len()
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            Err(TaskdeckError::backend_unavailable(
                "document store unreachable",
            ))
        } else {
            Ok(())
        }
    }

    /// The current result set for a query: documents in the query's
    /// collection whose `ownerId` matches, newest `createdAt` first.
    fn evaluate(&self, query: &DocumentQuery) -> Vec<Document> {
        let Some(documents) = self.collections.get(&query.collection) else {
            return Vec::new();
        };
        let mut result: Vec<Document> = documents
            .iter()
            .filter(|(_, fields)| {
                fields.get("ownerId").and_then(Value::as_str) == Some(query.owner_id.as_str())
            })
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect();
        result.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
        result
    }

    /// Pushes fresh snapshots to every watcher of the given
    /// collection, pruning watchers whose receiver is gone.
    fn notify(&mut self, collection: &str) {
        let snapshots: Vec<Option<Vec<Document>>> = self
            .watchers
            .iter()
            .map(|watcher| {
                (watcher.query.collection == collection).then(|| self.evaluate(&watcher.query))
            })
            .collect();
        let mut snapshots = snapshots.into_iter();
        self.watchers.retain(|watcher| {
            match snapshots.next().flatten() {
                Some(documents) => watcher.tx.send(QueryEvent::Snapshot(documents)).is_ok(),
                None => !watcher.tx.is_closed(),
            }
        });
    }
}

fn created_at(document: &Document) -> Option<DateTime<Utc>> {
    document
        .fields
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn subscribe(&self, query: DocumentQuery) -> Result<mpsc::UnboundedReceiver<QueryEvent>> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        let (tx, rx) = mpsc::unbounded_channel();
        // Current result set is the first event on the channel.
        let initial = inner.evaluate(&query);
        let _ = tx.send(QueryEvent::Snapshot(initial));
        inner.watchers.push(Watcher { query, tx });
        Ok(rx)
    }

    async fn create(&self, collection: &str, fields: Value) -> Result<String> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        if !fields.is_object() {
            return Err(TaskdeckError::unknown("document fields must be an object"));
        }
        let id = Uuid::new_v4().to_string();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        inner.notify(collection);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, partial_fields: Value) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        let Value::Object(partial) = partial_fields else {
            return Err(TaskdeckError::unknown("partial fields must be an object"));
        };
        let document = inner
            .collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| TaskdeckError::not_found(collection, id))?;
        let Some(target) = document.as_object_mut() else {
            return Err(TaskdeckError::unknown(format!(
                "document '{id}' is not an object"
            )));
        };
        // Merge, not replace: untouched fields survive.
        for (key, value) in partial {
            target.insert(key, value);
        }
        inner.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;

        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .is_some();
        // Deleting an absent id is a successful no-op; nothing changed,
        // so no snapshot is pushed.
        if removed {
            inner.notify(collection);
        }
        Ok(())
    }
}
