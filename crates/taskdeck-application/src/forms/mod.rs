//! Form controllers.
//!
//! One controller per form. Each submission validates first, then
//! invokes exactly one external operation and surfaces its outcome;
//! validation failures never leave this layer, and nothing is
//! retried. A controller ignores submits while one is in flight.
//!
//! # Module Structure
//!
//! - `auth`: login, signup and password-reset controllers
//! - `task`: task create/edit controller

use std::sync::atomic::{AtomicBool, Ordering};

mod auth;
mod task;

// Re-export public API
pub use auth::{LoginForm, PasswordResetForm, SignupForm};
pub use task::TaskForm;

/// Guards a controller against re-entrant submits. The flag is set
/// for the duration of one submission and cleared on every exit path.
#[derive(Default)]
struct SubmitGuard {
    in_flight: AtomicBool,
}

impl SubmitGuard {
    /// Tries to claim the in-flight slot. Returns false when a
    /// submission is already running.
    fn claim(&self) -> bool {
        !self.in_flight.swap(true, Ordering::SeqCst)
    }

    fn release(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Outcome of a submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission<T> {
    /// The submission ran to completion with this result.
    Completed(T),
    /// Ignored: another submission was already in flight.
    Ignored,
}

impl<T> Submission<T> {
    /// The completed value, if the submission ran.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Ignored => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}
