//! Session handling and HTTP boundary guarding for Warden.
//!
//! Provides:
//! - [`SessionStore`]: Tri-state identity store with atomic replacement
//! - [`IdentityProvider`]: Trait for async identity fetches (implement per backend)
//! - [`SessionSource`]: Where a boundary reads the session for a request
//! - [`GuardLayer`] / [`GuardService`]: Tower middleware applying the boundary guard
//! - [`AuthError`]: Identity-fetch error types

mod error;
mod middleware;
mod store;
mod user;

use std::future::Future;
use std::pin::Pin;

use warden_core::Principal;

pub use error::AuthError;
pub use middleware::{FromExtensions, GuardLayer, GuardService, SessionSource};
pub use store::SessionStore;
pub use user::{principal_from_parts, subject_from_parts};

/// Trait for fetching the current identity.
///
/// Implement this for each identity backend (token introspection, a
/// "who am I" endpoint, etc.). [`SessionStore::refresh`] calls `fetch()`
/// and publishes the result. `Ok(None)` means "definitely nobody".
pub trait IdentityProvider: Send + Sync + 'static {
    /// Fetch the current principal.
    fn fetch(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Principal>, AuthError>> + Send + '_>>;
}
