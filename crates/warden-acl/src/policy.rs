//! Declarative access requirements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use warden_core::{Permission, Role};

/// How a requirement's permission list is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionMode {
    /// At least one listed permission must be held.
    #[default]
    Any,
    /// Every listed permission must be held.
    All,
}

/// A predicate over a principal, built once per call site.
///
/// - `roles`: ANY-of. Empty means "no role check".
/// - `permissions`: combined with [`PermissionMode`]. Empty means
///   "no permission check".
/// - `redirect_to`: where the boundary guard sends an authenticated but
///   denied principal. `None` uses the guard's unauthorized destination.
///
/// An empty requirement is satisfied by any authenticated principal.
///
/// # Examples
///
/// ```
/// use warden_acl::AccessRequirement;
/// use warden_core::{Permission, Role};
///
/// let req = AccessRequirement::new()
///     .any_role([Role::Manager, Role::Admin])
///     .permissions([Permission::ApproveRegistration, Permission::RejectRegistration])
///     .require_all()
///     .redirect_to("/fleet");
/// assert!(!req.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequirement {
    #[serde(default)]
    roles: BTreeSet<Role>,
    #[serde(default)]
    permissions: BTreeSet<Permission>,
    #[serde(default)]
    mode: PermissionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redirect_to: Option<String>,
}

impl AccessRequirement {
    /// An empty requirement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept principals holding any of `roles`.
    pub fn any_role(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    /// Require `permissions`, combined with the current mode.
    pub fn permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    /// Every listed permission must be held.
    pub fn require_all(mut self) -> Self {
        self.mode = PermissionMode::All;
        self
    }

    /// At least one listed permission must be held (the default).
    pub fn require_any(mut self) -> Self {
        self.mode = PermissionMode::Any;
        self
    }

    /// Redirect target for boundary denials of an authenticated principal.
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect_to = Some(target.into());
        self
    }

    /// Accepted roles.
    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Required permissions.
    pub fn required_permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Combinator for [`required_permissions`](Self::required_permissions).
    pub fn mode(&self) -> PermissionMode {
        self.mode
    }

    /// Boundary redirect override.
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_to.as_deref()
    }

    /// Returns `true` if neither roles nor permissions are constrained.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty()
    }
}
