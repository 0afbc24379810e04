//! Infrastructure layer for taskdeck.
//!
//! This crate provides concrete implementations of the external
//! service traits defined in `taskdeck-core`. The in-memory backends
//! honor the exact contracts of the managed services (push
//! subscriptions, merge-on-update, owner-scoped queries) and back the
//! integration tests and local/offline operation.

pub mod memory_document_store;
pub mod memory_identity_service;

pub use memory_document_store::MemoryDocumentStore;
pub use memory_identity_service::MemoryIdentityService;
