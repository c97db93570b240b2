//! Access decisions.
//!
//! [`AccessGuard`] evaluates a principal against an [`AccessRequirement`] in
//! a fixed order, stopping at the first violated constraint:
//!
//! ```text
//! NoPrincipal ──► RoleCheck ──► PermissionCheck ──► Allow
//!      │              │                │
//!      ▼              ▼                ▼
//! Unauthenticated  RoleMismatch  PermissionMismatch
//! ```
//!
//! There are two entry points that differ only in the permission
//! combinator:
//!
//! - [`AccessGuard::boundary`] / [`AccessGuard::check_boundary`] gate a
//!   whole protected region. The permission check is always ANY-of, whatever
//!   mode the requirement carries.
//! - [`AccessGuard::check`] gates a single element and honors the
//!   requirement's [`PermissionMode`].

use serde::Serialize;
use std::fmt;

use warden_core::Principal;

use crate::policy::{AccessRequirement, PermissionMode};
use crate::resolver::Resolver;
use crate::session::Session;

/// Why access was denied. Reports the first violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No principal at evaluation time.
    Unauthenticated,
    /// Authenticated, but holds none of the accepted roles.
    RoleMismatch,
    /// Role check passed or was not required, but the permission check
    /// failed under the applicable combinator.
    PermissionMismatch,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::RoleMismatch => write!(f, "role mismatch"),
            Self::PermissionMismatch => write!(f, "permission mismatch"),
        }
    }
}

/// Outcome of a single evaluation. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Access granted.
    Allow,
    /// Access denied.
    Deny(DenyReason),
}

impl AccessDecision {
    /// Returns `true` for [`AccessDecision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The denial reason, if denied.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny(reason) => write!(f, "deny: {reason}"),
        }
    }
}

/// What a route/render boundary should do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "target", rename_all = "snake_case")]
pub enum BoundaryOutcome {
    /// Render the protected content.
    RenderChildren,
    /// Navigate elsewhere.
    Redirect(String),
    /// The identity is still loading; show a placeholder and re-evaluate
    /// once it resolves.
    RenderLoading,
}

/// Where the boundary guard redirects denied navigations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    /// Target when no principal is present.
    pub login: String,
    /// Target when an authenticated principal is denied and the requirement
    /// names no redirect of its own.
    pub unauthorized: String,
}

impl Default for Destinations {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            unauthorized: "/unauthorized".to_string(),
        }
    }
}

/// Turns (principal, requirement) into a decision.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    resolver: Resolver,
    destinations: Destinations,
}

impl AccessGuard {
    /// Create a guard with the default destinations.
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            destinations: Destinations::default(),
        }
    }

    /// Override the redirect destinations.
    pub fn with_destinations(mut self, destinations: Destinations) -> Self {
        self.destinations = destinations;
        self
    }

    /// The resolver used for role and permission queries.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The redirect destinations.
    pub fn destinations(&self) -> &Destinations {
        &self.destinations
    }

    /// Inline evaluation, honoring the requirement's [`PermissionMode`].
    pub fn check(
        &self,
        principal: Option<&Principal>,
        requirement: &AccessRequirement,
    ) -> AccessDecision {
        self.decide(principal, requirement, requirement.mode())
    }

    /// Boundary evaluation. The permission check is always ANY-of.
    pub fn check_boundary(
        &self,
        principal: Option<&Principal>,
        requirement: &AccessRequirement,
    ) -> AccessDecision {
        self.decide(principal, requirement, PermissionMode::Any)
    }

    /// Decide what a route/render boundary should do for `session`.
    ///
    /// - loading → [`BoundaryOutcome::RenderLoading`], with no decision made
    /// - unauthenticated → redirect to the login destination
    /// - other denials → redirect to the requirement's target, or the
    ///   unauthorized destination
    pub fn boundary(&self, session: &Session, requirement: &AccessRequirement) -> BoundaryOutcome {
        if session.is_loading() {
            return BoundaryOutcome::RenderLoading;
        }
        match self.check_boundary(session.principal(), requirement) {
            AccessDecision::Allow => BoundaryOutcome::RenderChildren,
            AccessDecision::Deny(DenyReason::Unauthenticated) => {
                BoundaryOutcome::Redirect(self.destinations.login.clone())
            }
            AccessDecision::Deny(_) => BoundaryOutcome::Redirect(
                requirement
                    .redirect_target()
                    .unwrap_or(self.destinations.unauthorized.as_str())
                    .to_string(),
            ),
        }
    }

    fn decide(
        &self,
        principal: Option<&Principal>,
        requirement: &AccessRequirement,
        mode: PermissionMode,
    ) -> AccessDecision {
        let Some(principal) = principal else {
            return AccessDecision::Deny(DenyReason::Unauthenticated);
        };

        let roles = requirement.roles();
        if !roles.is_empty() && !self.resolver.has_any_role(principal, roles) {
            return AccessDecision::Deny(DenyReason::RoleMismatch);
        }

        let permissions = requirement.required_permissions();
        if !permissions.is_empty() {
            let held = match mode {
                PermissionMode::Any => self.resolver.has_any_permission(principal, permissions),
                PermissionMode::All => self.resolver.has_all_permissions(principal, permissions),
            };
            if !held {
                return AccessDecision::Deny(DenyReason::PermissionMismatch);
            }
        }

        AccessDecision::Allow
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use warden_core::{Permission, Role};

    fn principal(roles: &[&str]) -> Principal {
        Principal::new("sub_1").with_raw_roles(roles.iter().copied())
    }

    #[test]
    fn test_admin_allowed_by_role_list() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new().any_role([Role::Manager, Role::Admin]);
        assert_eq!(
            guard.check(Some(&principal(&["Admin"])), &req),
            AccessDecision::Allow
        );
    }

    #[test]
    fn test_user_denied_manage_system() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new().permissions([Permission::ManageSystem]);
        assert_eq!(
            guard.check(Some(&principal(&["User"])), &req),
            AccessDecision::Deny(DenyReason::PermissionMismatch)
        );
    }

    #[test]
    fn test_no_principal_is_unauthenticated() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new().any_role([Role::Admin]);
        assert_eq!(
            guard.check(None, &req),
            AccessDecision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            guard.check(None, &AccessRequirement::new()),
            AccessDecision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_empty_requirement_allows_any_principal() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new();
        assert!(guard.check(Some(&principal(&[])), &req).is_allowed());
        assert!(guard.check(Some(&principal(&["Nobody"])), &req).is_allowed());
    }

    #[test]
    fn test_role_check_precedes_permission_check() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new()
            .any_role([Role::Admin])
            .permissions([Permission::ManageSystem]);
        assert_eq!(
            guard.check(Some(&principal(&["Guest"])), &req),
            AccessDecision::Deny(DenyReason::RoleMismatch)
        );
    }

    #[test]
    fn test_inline_honors_all_mode() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new()
            .permissions([Permission::ViewCars, Permission::EditCar])
            .require_all();
        let user = principal(&["User"]);
        assert_eq!(
            guard.check(Some(&user), &req),
            AccessDecision::Deny(DenyReason::PermissionMismatch)
        );
        assert!(guard.check(Some(&principal(&["Manager"])), &req).is_allowed());
    }

    #[test]
    fn test_boundary_always_uses_any_mode() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new()
            .permissions([Permission::ViewCars, Permission::EditCar])
            .require_all();
        let user = principal(&["User"]);
        assert!(guard.check_boundary(Some(&user), &req).is_allowed());
        assert_eq!(
            guard.boundary(&Session::present(user), &req),
            BoundaryOutcome::RenderChildren
        );
    }

    #[test]
    fn test_boundary_absent_redirects_to_login() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new().any_role([Role::Admin]).redirect_to("/elsewhere");
        assert_eq!(
            guard.boundary(&Session::Absent, &req),
            BoundaryOutcome::Redirect("/login".to_string())
        );
    }

    #[test]
    fn test_boundary_loading_defers() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new().any_role([Role::Admin]);
        assert_eq!(
            guard.boundary(&Session::Loading, &req),
            BoundaryOutcome::RenderLoading
        );
        assert_eq!(
            guard.boundary(&Session::Loading, &AccessRequirement::new()),
            BoundaryOutcome::RenderLoading
        );
    }

    #[test]
    fn test_boundary_denied_uses_unauthorized_destination() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new().any_role([Role::Admin]);
        assert_eq!(
            guard.boundary(&Session::present(principal(&["User"])), &req),
            BoundaryOutcome::Redirect("/unauthorized".to_string())
        );
    }

    #[test]
    fn test_boundary_denied_uses_requirement_target() {
        let guard = AccessGuard::default();
        let req = AccessRequirement::new()
            .permissions([Permission::ViewDashboard])
            .redirect_to("/cars");
        assert_eq!(
            guard.boundary(&Session::present(principal(&["Guest"])), &req),
            BoundaryOutcome::Redirect("/cars".to_string())
        );
    }

    #[test]
    fn test_custom_destinations() {
        let guard = AccessGuard::default().with_destinations(Destinations {
            login: "/sign-in".to_string(),
            unauthorized: "/403".to_string(),
        });
        let req = AccessRequirement::new().any_role([Role::Manager]);
        assert_eq!(
            guard.boundary(&Session::Absent, &req),
            BoundaryOutcome::Redirect("/sign-in".to_string())
        );
        assert_eq!(
            guard.boundary(&Session::present(principal(&["Guest"])), &req),
            BoundaryOutcome::Redirect("/403".to_string())
        );
    }

    #[test]
    fn test_decision_display_and_accessors() {
        assert_eq!(AccessDecision::Allow.to_string(), "allow");
        let deny = AccessDecision::Deny(DenyReason::RoleMismatch);
        assert_eq!(deny.to_string(), "deny: role mismatch");
        assert_eq!(deny.reason(), Some(DenyReason::RoleMismatch));
        assert_eq!(AccessDecision::Allow.reason(), None);
    }

    #[test]
    fn test_decision_serializes_tagged() {
        let json = serde_json::to_value(AccessDecision::Deny(DenyReason::PermissionMismatch)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"decision": "deny", "reason": "permission_mismatch"})
        );
        let json = serde_json::to_value(BoundaryOutcome::Redirect("/login".into())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"outcome": "redirect", "target": "/login"})
        );
    }
}
