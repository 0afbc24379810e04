//! Application layer for taskdeck.
//!
//! This crate provides the reactive services that sit between the
//! external backends and the presentation layer: the session store,
//! the live task collection, the validated form controllers, and the
//! wiring that ties identity changes to subscription lifecycle.

pub mod app;
pub mod forms;
pub mod session_store;
pub mod tasks;

pub use app::TaskApp;
pub use session_store::SessionStore;
pub use tasks::{TaskCollection, TaskListState};
