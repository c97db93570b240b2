//! Warden Core: roles, permissions, principals, and the registry.
//!
//! This crate holds the closed vocabulary every other Warden crate speaks.
//! It has no internal Warden dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`role`]: The closed [`Role`] and [`Permission`] enumerations
//! - [`principal`]: The authenticated subject
//! - [`registry`]: The immutable role→permission table

pub mod error;
pub mod principal;
pub mod registry;
pub mod role;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use principal::Principal;
pub use registry::{Registry, RegistryBuilder, RegistryConfig};
pub use role::{Permission, PermissionArea, Role, UnknownName};
