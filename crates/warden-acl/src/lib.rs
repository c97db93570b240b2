//! # warden-acl
//!
//! Access control decisions for Warden.
//!
//! This crate turns a principal and a declared requirement into an
//! allow/deny decision:
//! - [`Resolver`]: effective permission set and membership queries
//! - [`AccessRequirement`]: declarative role/permission predicate
//! - [`AccessGuard`]: sequential, short-circuiting evaluation in a boundary
//!   form (route subtrees) and an inline form (single elements)
//! - [`Guarded`]: decorator that retrofits a requirement onto any
//!   [`Renderable`]
//!
//! Evaluation is synchronous and pure. Nothing here performs I/O, logs, or
//! caches a decision.
//!
//! ```text
//! Registry ──► Resolver ──► AccessGuard ──► caller (router / component tree)
//! ```

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod enforcement;
pub mod policy;
mod proptests;
pub mod render;
pub mod resolver;
pub mod session;

pub use enforcement::{AccessDecision, AccessGuard, BoundaryOutcome, DenyReason, Destinations};
pub use policy::{AccessRequirement, PermissionMode};
pub use render::{Guarded, Nothing, RenderContext, RenderFn, Renderable};
pub use resolver::Resolver;
pub use session::Session;
