//! In-memory identity service implementation.
//!
//! A process-local stand-in for the managed identity provider. It
//! keeps an account registry, publishes auth-state changes on a watch
//! channel, and reports the same typed failures the real provider
//! does.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use taskdeck_core::error::{Result, TaskdeckError};
use taskdeck_core::identity::{AuthState, Identity, IdentityService};
use taskdeck_core::validation::MIN_PASSWORD_LEN;

/// A registered account.
#[derive(Debug, Clone)]
struct Account {
    password: String,
    identity: Identity,
}

/// In-memory implementation of [`IdentityService`].
///
/// State is shared through the watch channel: every subscriber sees
/// the current auth state immediately and every change thereafter, in
/// order. At most one identity is signed in at a time, matching the
/// single-session semantics of the managed provider.
pub struct MemoryIdentityService {
    accounts: Mutex<HashMap<String, Account>>,
    /// Password-reset requests recorded instead of sending email.
    reset_requests: Mutex<Vec<String>>,
    auth_tx: watch::Sender<AuthState>,
}

impl MemoryIdentityService {
    /// Creates a service with no accounts and nobody signed in.
    pub fn new() -> Self {
        let (auth_tx, _) = watch::channel(AuthState::SignedOut);
        Self {
            accounts: Mutex::new(HashMap::new()),
            reset_requests: Mutex::new(Vec::new()),
            auth_tx,
        }
    }

    /// Seeds an account without signing it in. Returns the identity
    /// the account will authenticate as.
    pub async fn seed_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Identity {
        let identity =
            Identity::new(Uuid::new_v4().to_string(), email).with_display_name(display_name);
        let mut accounts = self.accounts.lock().await;
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        identity
    }

    /// Publishes a subscription-level failure, as the managed provider
    /// does when e.g. a token refresh fails. Consumers keep their last
    /// observed identity.
    pub fn fail(&self, message: impl Into<String>) {
        self.auth_tx.send_replace(AuthState::Failed {
            message: message.into(),
        });
    }

    /// Emails a reset was requested for, in request order.
    pub async fn reset_requests(&self) -> Vec<String> {
        self.reset_requests.lock().await.clone()
    }
}

impl Default for MemoryIdentityService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityService for MemoryIdentityService {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.auth_tx.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let accounts = self.accounts.lock().await;
        let account = accounts
            .get(email)
            .filter(|account| account.password == password)
            .ok_or(TaskdeckError::InvalidCredentials)?;
        let identity = account.identity.clone();
        drop(accounts);

        self.auth_tx
            .send_replace(AuthState::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Identity> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(TaskdeckError::WeakPassword(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(TaskdeckError::EmailInUse(email.to_string()));
        }
        let identity =
            Identity::new(Uuid::new_v4().to_string(), email).with_display_name(display_name);
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        drop(accounts);

        self.auth_tx
            .send_replace(AuthState::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        self.auth_tx.send_replace(AuthState::SignedOut);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        let accounts = self.accounts.lock().await;
        if !accounts.contains_key(email) {
            return Err(TaskdeckError::UserNotFound(email.to_string()));
        }
        drop(accounts);

        self.reset_requests.lock().await.push(email.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let service = MemoryIdentityService::new();
        let created = service
            .sign_up("ada@example.com", "hunter22", "Ada")
            .await
            .unwrap();
        service.sign_out().await.unwrap();

        let signed_in = service
            .sign_in("ada@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(signed_in, created);
        assert_eq!(signed_in.label(), "Ada");
    }

    #[tokio::test]
    async fn test_sign_in_rejects_wrong_password_and_unknown_email() {
        let service = MemoryIdentityService::new();
        service.seed_account("ada@example.com", "hunter22", "Ada").await;

        let wrong = service.sign_in("ada@example.com", "nope").await;
        assert_eq!(wrong.unwrap_err(), TaskdeckError::InvalidCredentials);
        let unknown = service.sign_in("bob@example.com", "hunter22").await;
        assert_eq!(unknown.unwrap_err(), TaskdeckError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email_and_weak_password() {
        let service = MemoryIdentityService::new();
        service.seed_account("ada@example.com", "hunter22", "Ada").await;

        let duplicate = service.sign_up("ada@example.com", "hunter22", "Ada").await;
        assert!(matches!(duplicate, Err(TaskdeckError::EmailInUse(_))));
        let weak = service.sign_up("bob@example.com", "abc", "Bob").await;
        assert!(matches!(weak, Err(TaskdeckError::WeakPassword(_))));
    }

    #[tokio::test]
    async fn test_subscription_observes_changes_in_order() {
        let service = MemoryIdentityService::new();
        let mut rx = service.subscribe();
        assert_eq!(*rx.borrow_and_update(), AuthState::SignedOut);

        let identity = service
            .sign_up("ada@example.com", "hunter22", "Ada")
            .await
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AuthState::SignedIn(identity));

        service.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_password_reset_records_request() {
        let service = MemoryIdentityService::new();
        service.seed_account("ada@example.com", "hunter22", "Ada").await;

        service.send_password_reset("ada@example.com").await.unwrap();
        assert_eq!(service.reset_requests().await, vec!["ada@example.com"]);

        let missing = service.send_password_reset("ghost@example.com").await;
        assert!(matches!(missing, Err(TaskdeckError::UserNotFound(_))));
    }
}
