//! Identity domain module.
//!
//! Contains the identity domain model and the service trait through
//! which the external identity provider is consumed.
//!
//! # Module Structure
//!
//! - `model`: Identity value object and auth-state notifications
//! - `service`: Service trait for the external identity provider

mod model;
mod service;

// Re-export public API
pub use model::{AuthState, Identity};
pub use service::IdentityService;
