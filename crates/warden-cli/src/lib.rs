//! # warden-cli
//!
//! Admin CLI for Warden.
//!
//! - `warden roles`: the role table, and permissions no role grants
//! - `warden permissions <role>`: one role's grants grouped by area
//! - `warden check`: evaluate a requirement against a hypothetical principal,
//!   both inline and at a boundary
//! - `warden config path|init`: locate or create the config file

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use config::{RoutesConfig, WardenConfig};
pub use error::{Error, Result};
