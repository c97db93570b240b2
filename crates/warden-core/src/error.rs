//! Error types for warden-core

use thiserror::Error;

/// Result type alias for warden-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-core.
///
/// None of these are raised while evaluating access. They only surface
/// while *building* a registry from external configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A role name in a registry table is not part of the role enumeration.
    #[error("Unknown role '{0}' in registry table")]
    UnknownRole(String),

    /// A permission name in a registry table is not part of the permission
    /// enumeration.
    #[error("Unknown permission '{permission}' granted to role '{role}'")]
    UnknownPermission {
        /// Role whose entry contains the bad name
        role: String,
        /// The unrecognized permission name
        permission: String,
    },

    /// The registry table could not be parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
