//! Session domain model.
//!
//! The session is the application's reactive view of "who is signed in
//! right now". It is owned by the session store in the application
//! layer; everything else reads it through a watch receiver.

use serde::{Deserialize, Serialize};

use crate::identity::{AuthState, Identity};

/// Whether the session has heard from the identity provider yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No notification received yet; identity is undetermined.
    Loading,
    /// At least one notification received; identity is authoritative.
    Ready,
}

/// The current authenticated identity, exposed reactively.
///
/// Starts `Loading` with no identity. The first notification from the
/// identity provider moves it to `Ready` and it stays there; later
/// notifications only replace the identity or the error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Identity of the signed-in user, if any.
    pub identity: Option<Identity>,
    /// Lifecycle status of the session itself.
    pub status: SessionStatus,
    /// Last subscription-level failure reported by the provider.
    pub error: Option<String>,
}

impl Session {
    /// The session as it exists before the provider has reported anything.
    pub fn loading() -> Self {
        Self {
            identity: None,
            status: SessionStatus::Loading,
            error: None,
        }
    }

    /// Folds one auth notification into the session.
    ///
    /// Sign-in and sign-out replace the identity and clear the error.
    /// A provider failure sets the error but keeps the previous
    /// identity, so consumers see stale-but-present state rather than
    /// a destructive clear. Every notification marks the session
    /// `Ready` - a failure before the first valid state is non-fatal.
    pub fn apply(&mut self, state: AuthState) {
        match state {
            AuthState::SignedIn(identity) => {
                self.identity = Some(identity);
                self.error = None;
            }
            AuthState::SignedOut => {
                self.identity = None;
                self.error = None;
            }
            AuthState::Failed { message } => {
                self.error = Some(message);
            }
        }
        self.status = SessionStatus::Ready;
    }

    /// Uid of the signed-in user, if any.
    pub fn owner_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.uid.as_str())
    }

    /// True once the provider has reported at least once.
    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}
