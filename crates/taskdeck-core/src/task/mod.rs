//! Task domain module.
//!
//! Contains the task domain model, the payload types for mutations,
//! and the document-store trait through which tasks are persisted.
//!
//! # Module Structure
//!
//! - `model`: Core task domain model (`Task`, `TaskStatus`) and the
//!   mutation payloads (`NewTask`, `TaskPatch`)
//! - `store`: Document store trait and live-query types

mod model;
mod store;

// Re-export public API
pub use model::{NewTask, Task, TaskPatch, TaskStatus};
pub use store::{Document, DocumentQuery, DocumentStore, QueryEvent};
