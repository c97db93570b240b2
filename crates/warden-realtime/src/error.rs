//! Error types for warden-realtime

/// Result type alias for warden-realtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by transports and the notification hub.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The transport could not establish a connection.
    #[error("Connect error: {message}")]
    Connect {
        /// Human-readable error message
        message: String,
    },

    /// An established connection failed.
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// The server refused the connection outright (bad endpoint, rejected
    /// credentials). Retrying will not help.
    #[error("Connection rejected: {message}")]
    Rejected {
        /// Human-readable error message
        message: String,
    },

    /// An inbound frame was not a valid notification.
    #[error("Malformed notification: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The hub did not reach the expected state in time.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl Error {
    /// Returns whether a reconnect attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connect { .. } => true,
            Error::Transport { .. } => true,
            Error::Timeout(_) => true,
            Error::Rejected { .. } => false,
            Error::Malformed(_) => false,
        }
    }

    /// Creates a new connect error.
    pub fn connect<S: Into<String>>(message: S) -> Self {
        Error::Connect {
            message: message.into(),
        }
    }

    /// Creates a new transport error.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Error::Transport {
            message: message.into(),
        }
    }

    /// Creates a new rejection error.
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Error::Rejected {
            message: message.into(),
        }
    }
}
