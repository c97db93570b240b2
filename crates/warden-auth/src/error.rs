//! Identity-fetch error types.

/// Errors that can occur while fetching or refreshing the identity.
///
/// Access denials are never represented here; those are
/// [`warden_acl::AccessDecision`] values.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token is available to identify the subject.
    #[error("missing authentication token")]
    MissingToken,

    /// The token or identity payload is malformed.
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// The token has expired.
    #[error("token has expired")]
    Expired,

    /// The identity payload carries no subject.
    #[error("identity missing subject claim")]
    MissingSubject,

    /// The identity provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The identity fetch did not resolve in time.
    #[error("identity not resolved after {0:?}")]
    Timeout(std::time::Duration),
}

impl AuthError {
    /// Whether this error means the subject is not authenticated (vs. a
    /// transient server-side failure worth retrying).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidFormat(_)
                | AuthError::Expired
                | AuthError::MissingSubject
        )
    }
}
