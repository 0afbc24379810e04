//! Reactive session store.
//!
//! Owns the application's [`Session`] and keeps it in step with the
//! identity provider. Consumers get watch receivers and read-only
//! snapshots; only this store writes the session.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use taskdeck_core::identity::IdentityService;
use taskdeck_core::session::Session;

/// Tracks the current authenticated identity and exposes it reactively.
///
/// Subscribes exactly once to the identity provider at construction.
/// The provider's subscription is long-lived and self-healing, so this
/// store deliberately adds no polling or retry loop of its own; it
/// only folds notifications into the session, in delivery order.
pub struct SessionStore {
    session_tx: Arc<watch::Sender<Session>>,
    listener: JoinHandle<()>,
}

impl SessionStore {
    /// Creates the store and starts listening to the identity provider.
    ///
    /// The session begins in `Loading`; the provider's current state
    /// counts as the first notification and moves it to `Ready`.
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        let session_tx = Arc::new(watch::channel(Session::loading()).0);

        let mut auth_rx = identity.subscribe();
        let tx = session_tx.clone();
        let listener = tokio::spawn(async move {
            loop {
                let state = auth_rx.borrow_and_update().clone();
                tracing::debug!(?state, "auth notification");
                tx.send_modify(|session| session.apply(state));
                if auth_rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Self {
            session_tx,
            listener,
        }
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session_tx.subscribe()
    }

    /// A point-in-time copy of the current session.
    pub fn session(&self) -> Session {
        self.session_tx.borrow().clone()
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
