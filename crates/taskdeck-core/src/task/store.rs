//! Document store trait.
//!
//! Defines the interface for the external document database: CRUD on
//! schemaless documents plus live query subscriptions that push whole
//! snapshots.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Result, TaskdeckError};

/// A live query: one collection, filtered to one owner, ordered by
/// `createdAt` descending. This is the only query shape the
/// application needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    /// Collection to watch.
    pub collection: String,
    /// Only documents whose `ownerId` equals this value are visible.
    pub owner_id: String,
}

impl DocumentQuery {
    pub fn new(collection: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            owner_id: owner_id.into(),
        }
    }
}

/// A single document as pushed by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier, unique within the collection.
    pub id: String,
    /// The document's fields as a JSON object.
    pub fields: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Deserializes the document into a typed entity, folding the
    /// store-assigned id into the fields under `"id"` first.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut fields = self.fields.clone();
        match fields.as_object_mut() {
            Some(map) => {
                map.insert("id".to_string(), Value::String(self.id.clone()));
            }
            None => {
                return Err(TaskdeckError::unknown(format!(
                    "document '{}' is not an object",
                    self.id
                )));
            }
        }
        Ok(serde_json::from_value(fields)?)
    }
}

/// An event delivered on a live query subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    /// A complete, point-in-time result set superseding the previous one.
    Snapshot(Vec<Document>),
    /// The subscription hit a backend fault. The subscription stays
    /// alive; previously delivered state is still the latest known.
    Error { message: String },
}

/// An abstract interface to the external document database.
///
/// Implementations must deliver snapshots for a given subscription in
/// the order they are produced, and must treat `update` as a merge of
/// the given fields into the stored document, never a replacement.
///
/// # Errors
///
/// Any call may fail with `BackendUnavailable` or `PermissionDenied`;
/// messages are propagated verbatim.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Opens a live query and returns the channel its events arrive
    /// on. The current result set is pushed as the first event.
    /// Dropping the receiver closes the subscription.
    async fn subscribe(&self, query: DocumentQuery) -> Result<mpsc::UnboundedReceiver<QueryEvent>>;

    /// Creates a document and returns its assigned id.
    async fn create(&self, collection: &str, fields: Value) -> Result<String>;

    /// Merges the given fields into an existing document.
    async fn update(&self, collection: &str, id: &str, partial_fields: Value) -> Result<()>;

    /// Deletes a document. Deleting an id that does not exist is not
    /// an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}
