//! Error types for the taskdeck application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationErrors;

/// A shared error type for the entire taskdeck application.
///
/// This provides typed, structured error variants covering the identity
/// service outcomes, document store failures, and the operations built
/// on top of them. Messages reported by external backends are carried
/// verbatim so the UI layer can display them unmodified.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskdeckError {
    /// An operation that needs an active identity was attempted without one
    #[error("not authenticated")]
    NotAuthenticated,

    /// Form input was rejected by a validation schema
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The backend could not be reached or refused service
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend rejected the call for the current identity
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Sign-in with an unknown email or wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account
    #[error("email already in use: {0}")]
    EmailInUse(String),

    /// Sign-up with a password below the minimum strength
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Password reset requested for an unknown email
    #[error("no account found for {0}")]
    UserNotFound(String),

    /// A document the operation refers to does not exist
    #[error("document not found: {collection} '{id}'")]
    NotFound { collection: String, id: String },

    /// Any other caught failure, message preserved
    #[error("{0}")]
    Unknown(String),
}

impl TaskdeckError {
    /// Creates a BackendUnavailable error
    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable(message.into())
    }

    /// Creates a PermissionDenied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates an Unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Field-level messages when this is a validation error.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for TaskdeckError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<serde_json::Error> for TaskdeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unknown(format!("serialization error: {err}"))
    }
}

/// A type alias for `Result<T, TaskdeckError>`.
pub type Result<T> = std::result::Result<T, TaskdeckError>;
