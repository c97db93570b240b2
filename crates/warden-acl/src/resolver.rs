//! Effective permission resolution.
//!
//! A [`Resolver`] answers questions about a principal's roles and the
//! permissions they reach through the [`Registry`]. Every method accepts
//! either `&Principal` or `Option<&Principal>`; `None` means "no principal"
//! and never holds any role or permission.

use std::collections::BTreeSet;
use std::sync::Arc;

use warden_core::{Permission, Principal, Registry, Role};

/// Derives and queries effective permission sets.
///
/// Cheap to clone (the registry is behind an `Arc`). Holds no state besides
/// the registry, so every answer is a pure function of the registry and the
/// principal passed in.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<Registry>,
}

impl Resolver {
    /// Create a resolver over the given registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The registry this resolver reads.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Recognized roles of `principal`, deduplicated, in declaration order.
    ///
    /// Raw role names that are not part of the enumeration are dropped.
    pub fn known_roles_of(&self, principal: &Principal) -> Vec<Role> {
        principal
            .roles
            .iter()
            .filter_map(|name| name.parse::<Role>().ok())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Raw role names of `principal` that were filtered out as unrecognized.
    pub fn unknown_roles_of<'p>(&self, principal: &'p Principal) -> Vec<&'p str> {
        principal
            .roles
            .iter()
            .map(String::as_str)
            .filter(|name| !self.registry.is_known_role(name))
            .collect()
    }

    /// Union of the permissions of every recognized role.
    ///
    /// Empty for a principal with no recognized roles and for no principal.
    pub fn effective_permissions<'a>(
        &self,
        principal: impl Into<Option<&'a Principal>>,
    ) -> BTreeSet<Permission> {
        let principal: Option<&Principal> = principal.into();
        let Some(principal) = principal else {
            return BTreeSet::new();
        };
        self.known_roles_of(principal)
            .into_iter()
            .flat_map(|role| self.registry.permissions_for(role).iter().copied())
            .collect()
    }

    /// Returns `true` if the principal's effective set contains `permission`.
    pub fn has_permission<'a>(
        &self,
        principal: impl Into<Option<&'a Principal>>,
        permission: Permission,
    ) -> bool {
        self.effective_permissions(principal).contains(&permission)
    }

    /// Returns `true` if at least one of `permissions` is held.
    ///
    /// An empty `permissions` input is `false`. Callers with nothing to check
    /// should skip the check rather than rely on this.
    pub fn has_any_permission<'a, 'b>(
        &self,
        principal: impl Into<Option<&'a Principal>>,
        permissions: impl IntoIterator<Item = &'b Permission>,
    ) -> bool {
        let effective = self.effective_permissions(principal);
        permissions.into_iter().any(|p| effective.contains(p))
    }

    /// Returns `true` if every one of `permissions` is held.
    ///
    /// An empty `permissions` input is `true`.
    pub fn has_all_permissions<'a, 'b>(
        &self,
        principal: impl Into<Option<&'a Principal>>,
        permissions: impl IntoIterator<Item = &'b Permission>,
    ) -> bool {
        let effective = self.effective_permissions(principal);
        permissions.into_iter().all(|p| effective.contains(p))
    }

    /// Returns `true` if the principal holds `role` (not derived permissions).
    pub fn has_role<'a>(&self, principal: impl Into<Option<&'a Principal>>, role: Role) -> bool {
        let principal: Option<&Principal> = principal.into();
        principal.is_some_and(|p| self.known_roles_of(p).contains(&role))
    }

    /// Returns `true` if the principal holds at least one of `roles`.
    ///
    /// An empty `roles` input is `false`.
    pub fn has_any_role<'a, 'b>(
        &self,
        principal: impl Into<Option<&'a Principal>>,
        roles: impl IntoIterator<Item = &'b Role>,
    ) -> bool {
        let principal: Option<&Principal> = principal.into();
        let Some(principal) = principal else {
            return false;
        };
        let held = self.known_roles_of(principal);
        roles.into_iter().any(|r| held.contains(r))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Arc::new(Registry::builtin()))
    }
}
