//! Tri-state view of the current identity.

use std::fmt;
use std::sync::Arc;

use warden_core::Principal;

/// What the identity store currently knows about the subject.
///
/// `Loading` is kept separate from `Absent` so a guard never reports
/// "unauthenticated" for an identity that simply has not arrived yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// Definitely no authenticated subject.
    #[default]
    Absent,
    /// An identity fetch is in flight.
    Loading,
    /// An authenticated subject.
    Present(Arc<Principal>),
}

impl Session {
    /// Wraps a principal.
    pub fn present(principal: Principal) -> Self {
        Self::Present(Arc::new(principal))
    }

    /// The principal, if one is present.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Present(p) => Some(p),
            Self::Absent | Self::Loading => None,
        }
    }

    /// Returns `true` while an identity fetch is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` once the session is `Absent` or `Present`.
    pub fn is_resolved(&self) -> bool {
        !self.is_loading()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Loading => write!(f, "loading"),
            Self::Present(p) => write!(f, "present: {}", p.subject),
        }
    }
}

impl From<Option<Principal>> for Session {
    fn from(principal: Option<Principal>) -> Self {
        principal.map_or(Self::Absent, Self::present)
    }
}
