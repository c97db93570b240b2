//! Error types for warden-cli

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for warden-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from warden-core (bad role table)
    #[error("Registry error: {0}")]
    Core(#[from] warden_core::Error),

    /// Configuration problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable error message
        message: String,
    },

    /// Unrecognized role name on the command line
    #[error("Unknown role '{0}' (expected one of: Admin, Manager, User, Guest)")]
    UnknownRole(String),

    /// Unrecognized permission name on the command line
    #[error("Unknown permission '{0}'")]
    UnknownPermission(String),

    /// I/O error with file path context
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
