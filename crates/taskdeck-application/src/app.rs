//! Application wiring.
//!
//! Composes the external services with the reactive stores and owns
//! the one place where identity changes drive the task subscription
//! lifecycle.

use std::sync::Arc;

use tokio::task::JoinHandle;

use taskdeck_core::config::BackendConfig;
use taskdeck_core::identity::IdentityService;
use taskdeck_core::session::Session;
use taskdeck_core::task::DocumentStore;
use taskdeck_infrastructure::{MemoryDocumentStore, MemoryIdentityService};

use crate::session_store::SessionStore;
use crate::tasks::TaskCollection;

/// The assembled reactive core.
///
/// Owns the session store, the task collection, and the link task
/// that retargets the task subscription on every identity change.
/// Teardown-before-resubscribe ordering lives here and nowhere else:
/// the previous owner's subscription is gone before the next owner's
/// is opened.
pub struct TaskApp {
    identity: Arc<dyn IdentityService>,
    session_store: Arc<SessionStore>,
    tasks: Arc<TaskCollection>,
    link: JoinHandle<()>,
}

impl TaskApp {
    /// Wires the core against the given backends.
    pub fn new(
        identity: Arc<dyn IdentityService>,
        store: Arc<dyn DocumentStore>,
        config: &BackendConfig,
    ) -> Self {
        let session_store = Arc::new(SessionStore::new(identity.clone()));
        let tasks = Arc::new(TaskCollection::new(store, config));

        let mut session_rx = session_store.subscribe();
        let collection = tasks.clone();
        let link = tokio::spawn(async move {
            loop {
                let owner = owner_of(&session_rx.borrow_and_update());
                if let Some(owner) = owner
                    && let Err(err) = collection.set_owner(owner).await
                {
                    // Already reflected in the task list state; the
                    // presentation layer decides what to show.
                    tracing::warn!(error = %err, "retargeting task subscription failed");
                }
                if session_rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Self {
            identity,
            session_store,
            tasks,
            link,
        }
    }

    /// Wires the core against fresh in-memory backends.
    pub fn in_memory(config: &BackendConfig) -> Self {
        Self::new(
            Arc::new(MemoryIdentityService::new()),
            Arc::new(MemoryDocumentStore::new()),
            config,
        )
    }

    /// The identity service the app was wired with.
    pub fn identity(&self) -> Arc<dyn IdentityService> {
        self.identity.clone()
    }

    /// The reactive session store.
    pub fn session_store(&self) -> Arc<SessionStore> {
        self.session_store.clone()
    }

    /// The live task collection.
    pub fn tasks(&self) -> Arc<TaskCollection> {
        self.tasks.clone()
    }
}

impl Drop for TaskApp {
    fn drop(&mut self) {
        self.link.abort();
    }
}

/// The owner the task collection should track for this session:
/// `None` while loading (leave the collection untouched), otherwise
/// the signed-in uid or an explicit absence.
fn owner_of(session: &Session) -> Option<Option<String>> {
    if !session.is_ready() {
        return None;
    }
    Some(session.owner_id().map(str::to_string))
}
