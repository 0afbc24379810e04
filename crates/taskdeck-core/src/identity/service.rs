//! Identity service trait.
//!
//! Defines the interface to the external identity provider.

use async_trait::async_trait;
use tokio::sync::watch;

use super::model::{AuthState, Identity};
use crate::error::Result;

/// An abstract interface to the external identity provider.
///
/// This trait decouples the application from the concrete provider
/// (a managed auth service, an in-memory test double). The provider
/// owns credential handling end to end; this layer never sees password
/// hashes or tokens.
///
/// # Subscription semantics
///
/// `subscribe` hands out a watch receiver whose current value is the
/// provider's present auth state; every later change is observable
/// through it in delivery order. The channel is long-lived and
/// self-healing on the provider side, so consumers must not layer
/// their own polling or retry loop on top. Dropping the receiver
/// unsubscribes.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Subscribes to auth-state change notifications.
    fn subscribe(&self) -> watch::Receiver<AuthState>;

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials`: unknown email or wrong password
    /// - `BackendUnavailable` / `PermissionDenied`: backend failure
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    /// Creates a new account and signs it in.
    ///
    /// # Errors
    ///
    /// - `EmailInUse`: an account already exists for the email
    /// - `WeakPassword`: the password fails the provider's policy
    /// - `BackendUnavailable` / `PermissionDenied`: backend failure
    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Identity>;

    /// Signs out the current user, if any.
    async fn sign_out(&self) -> Result<()>;

    /// Sends a password-reset message to the given email.
    ///
    /// # Errors
    ///
    /// - `UserNotFound`: no account exists for the email
    /// - `BackendUnavailable` / `PermissionDenied`: backend failure
    async fn send_password_reset(&self, email: &str) -> Result<()>;
}
