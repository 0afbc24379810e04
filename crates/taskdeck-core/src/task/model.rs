//! Task domain model.
//!
//! This module contains the core Task entity and the payload types
//! used to create and update tasks through the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Represents the completion status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// The task has not been started.
    Todo,
    /// The task is actively being worked on.
    InProgress,
    /// The task is finished.
    Done,
}

impl TaskStatus {
    /// All statuses, in workflow order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// The wire/form value for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// A task owned by a single user.
///
/// The document store is the sole source of truth for tasks; instances
/// of this struct are decoded from pushed snapshots and are never
/// mutated locally. `owner_id` scoping is enforced by the subscription
/// query, not by the entity itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier assigned by the document store.
    pub id: String,
    /// Uid of the identity that owns this task.
    pub owner_id: String,
    /// Short human-readable title. Required, non-empty.
    pub title: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Completion status.
    pub status: TaskStatus,
    /// Optional due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// When the task was created. Immutable.
    pub created_at: DateTime<Utc>,
    /// When the task was last modified. Advanced on every update.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task.
///
/// The sync layer fills in the owner, the initial `Todo` status and
/// both timestamps; callers only supply what the user typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Creates a payload with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Builds the full document field map for creation.
    pub fn into_fields(self, owner_id: &str, now: DateTime<Utc>) -> Value {
        let mut fields = json!({
            "ownerId": owner_id,
            "title": self.title,
            "status": TaskStatus::Todo,
            "createdAt": now,
            "updatedAt": now,
        });
        let map = fields.as_object_mut().expect("object literal");
        if let Some(description) = self.description {
            map.insert("description".to_string(), Value::String(description));
        }
        if let Some(due_date) = self.due_date {
            map.insert("dueDate".to_string(), json!(due_date));
        }
        fields
    }
}

/// Partial update for a task.
///
/// Only the fields set on the patch are sent to the store; the backend
/// merges them into the existing document. The sync layer always adds
/// a fresh `updatedAt`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the status.
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the due date.
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Builds the partial field map for this patch, including the
    /// unconditional `updatedAt` bump.
    pub fn into_fields(self, now: DateTime<Utc>) -> Value {
        let mut map = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        map.insert("updatedAt".to_string(), json!(now));
        Value::Object(map)
    }
}
