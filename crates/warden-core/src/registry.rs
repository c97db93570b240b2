//! The role→permission registry.
//!
//! A [`Registry`] is built once (from the built-in table, a
//! [`RegistryBuilder`], or a TOML [`RegistryConfig`]) and never mutated
//! afterwards. Share it behind an `Arc`; every lookup is a read.
//!
//! # Usage
//!
//! ```rust
//! use warden_core::{Permission, Registry, Role};
//!
//! let registry = Registry::builtin();
//! assert!(registry.permissions_for(Role::User).contains(&Permission::CreateBooking));
//! assert!(registry.permissions_for_name("Superuser").is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::role::{Permission, PermissionArea, Role};

static NO_PERMISSIONS: BTreeSet<Permission> = BTreeSet::new();

// ============================================================================
// Registry
// ============================================================================

/// Immutable mapping from every [`Role`] to its permission set.
///
/// Every declared role has exactly one entry, possibly empty. Permissions
/// that no role grants are dead but valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    table: BTreeMap<Role, BTreeSet<Permission>>,
}

impl Registry {
    /// The table the rental and classroom applications ship with.
    pub fn builtin() -> Self {
        use Permission::*;

        Self::builder()
            .grant(Role::Admin, Permission::ALL)
            .grant(
                Role::Manager,
                [
                    ViewUsers,
                    ViewRegistrations,
                    ApproveRegistration,
                    RejectRegistration,
                    ViewCars,
                    CreateCar,
                    EditCar,
                    DeleteCar,
                    ViewBookings,
                    ManageBookings,
                    ViewDashboard,
                    ViewReports,
                ],
            )
            .grant(
                Role::User,
                [ViewCars, CreateBooking, CancelBooking, ViewOwnBookings],
            )
            .grant(Role::Guest, [ViewCars])
            .build()
    }

    /// Starts an empty table.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Builds a registry from a parsed configuration table.
    ///
    /// Unlike evaluation-time lookups, configuration is strict: an unknown
    /// role or permission name is an error, since it is a typo in a file the
    /// operator controls.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut builder = Self::builder();
        for (role_name, perms) in &config.roles {
            let role: Role = role_name
                .parse()
                .map_err(|_| Error::UnknownRole(role_name.clone()))?;
            let mut granted = Vec::with_capacity(perms.len());
            for name in perms {
                let perm: Permission = name.parse().map_err(|_| Error::UnknownPermission {
                    role: role_name.clone(),
                    permission: name.clone(),
                })?;
                granted.push(perm);
            }
            builder = builder.grant(role, granted);
        }
        Ok(builder.build())
    }

    /// Parses a TOML document with a `[roles]` table and builds a registry.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RegistryConfig = toml::from_str(s)?;
        Self::from_config(&config)
    }

    /// Returns the permissions declared for `role`.
    ///
    /// A role with no entry yields the empty set; lookup never fails.
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        self.table.get(&role).unwrap_or(&NO_PERMISSIONS)
    }

    /// Returns the permissions declared for a raw role name.
    ///
    /// Unrecognized names yield the empty set.
    pub fn permissions_for_name(&self, value: &str) -> &BTreeSet<Permission> {
        match value.parse::<Role>() {
            Ok(role) => self.permissions_for(role),
            Err(_) => &NO_PERMISSIONS,
        }
    }

    /// Returns `true` if `value` names a declared role.
    pub fn is_known_role(&self, value: &str) -> bool {
        Role::is_known(value)
    }

    /// Returns `true` if `value` names a declared permission.
    pub fn is_known_permission(&self, value: &str) -> bool {
        Permission::is_known(value)
    }

    /// Iterates over every role and its permission set.
    pub fn entries(&self) -> impl Iterator<Item = (Role, &BTreeSet<Permission>)> {
        self.table.iter().map(|(role, perms)| (*role, perms))
    }

    /// Permissions that no role grants.
    pub fn unreachable_permissions(&self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| !self.table.values().any(|perms| perms.contains(p)))
            .collect()
    }

    /// Groups `role`'s permissions by resource area.
    pub fn permission_areas(&self, role: Role) -> BTreeMap<PermissionArea, Vec<Permission>> {
        let mut areas: BTreeMap<PermissionArea, Vec<Permission>> = BTreeMap::new();
        for perm in self.permissions_for(role) {
            areas.entry(perm.area()).or_default().push(*perm);
        }
        areas
    }

    /// Converts back into a serializable table.
    pub fn to_config(&self) -> RegistryConfig {
        RegistryConfig {
            roles: self
                .entries()
                .map(|(role, perms)| {
                    (
                        role.as_str().to_string(),
                        perms.iter().map(|p| p.as_str().to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// RegistryBuilder
// ============================================================================

/// Accumulates grants, then freezes them into a [`Registry`].
#[derive(Debug, Default, Clone)]
pub struct RegistryBuilder {
    table: BTreeMap<Role, BTreeSet<Permission>>,
}

impl RegistryBuilder {
    /// Grants `permissions` to `role`, merging with earlier grants.
    pub fn grant<I>(mut self, role: Role, permissions: I) -> Self
    where
        I: IntoIterator<Item = Permission>,
    {
        self.table.entry(role).or_default().extend(permissions);
        self
    }

    /// Freezes the table. Roles never granted anything get an empty entry.
    pub fn build(mut self) -> Registry {
        for role in Role::ALL {
            self.table.entry(role).or_default();
        }
        Registry { table: self.table }
    }
}

// ============================================================================
// RegistryConfig
// ============================================================================

/// Serializable form of the role table.
///
/// ```toml
/// [roles]
/// Admin = ["view_users", "manage_system"]
/// Guest = ["view_cars"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Role name → permission names.
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<String>>,
}
