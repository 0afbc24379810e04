//! Identity domain model.
//!
//! The authenticated user as reported by the external identity
//! provider, and the notification payload its subscription carries.

use serde::{Deserialize, Serialize};

/// An authenticated user identity issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque unique identifier assigned by the provider.
    pub uid: String,
    /// Email address the account was registered with.
    pub email: String,
    /// Optional display name chosen at sign-up.
    pub display_name: Option<String>,
}

impl Identity {
    /// Creates an identity with no display name.
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Name suitable for greeting the user: display name when set,
    /// email otherwise.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// A notification pushed by the identity provider's subscription.
///
/// The provider reports its current state immediately on subscription
/// and again on every change. `Failed` signals a fault in the
/// subscription itself; it carries no identity and consumers are
/// expected to keep whatever identity they last observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    /// No user is signed in.
    SignedOut,
    /// A user is signed in.
    SignedIn(Identity),
    /// The provider reported a failure; prior state is unknown.
    Failed { message: String },
}

impl AuthState {
    /// The identity carried by this notification, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }
}
