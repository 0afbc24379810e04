pub mod config;
pub mod error;
pub mod identity;
pub mod session;
pub mod task;
pub mod validation;
pub mod view;

// Re-export common error type
pub use error::{Result, TaskdeckError};
