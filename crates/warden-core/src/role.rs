//! The closed role and permission enumerations.
//!
//! Both sets are fixed at build time. Anything arriving from outside
//! (token claims, config files, CLI arguments) is parsed into these types
//! with [`std::str::FromStr`]; strings that do not parse are treated as
//! granting nothing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Role
// ============================================================================

/// Coarse-grained identity category assigned to a principal.
///
/// The wire form is the variant name (`"Admin"`, `"Guest"`), which is what
/// the identity provider puts in the `roles` claim. Parsing is
/// case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full control over the system.
    Admin,
    /// Back-office staff: fleet, registrations, bookings.
    Manager,
    /// A registered customer.
    User,
    /// Browsing without an account-level grant.
    Guest,
}

impl Role {
    /// Every declared role, in declaration order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::User, Role::Guest];

    /// Returns the wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::User => "User",
            Role::Guest => "Guest",
        }
    }

    /// Returns `true` if `value` names a declared role.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_core::Role;
    ///
    /// assert!(Role::is_known("Admin"));
    /// assert!(!Role::is_known("Superuser"));
    /// assert!(!Role::is_known("admin"));
    /// ```
    pub fn is_known(value: &str) -> bool {
        value.parse::<Role>().is_ok()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

// ============================================================================
// Permission
// ============================================================================

/// Resource area a permission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionArea {
    /// User accounts.
    Users,
    /// Pending sign-up registrations.
    Registrations,
    /// The rental fleet.
    Cars,
    /// Customer bookings.
    Bookings,
    /// Dashboard, reports, and system settings.
    System,
}

impl fmt::Display for PermissionArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionArea::Users => "users",
            PermissionArea::Registrations => "registrations",
            PermissionArea::Cars => "cars",
            PermissionArea::Bookings => "bookings",
            PermissionArea::System => "system",
        };
        f.write_str(s)
    }
}

/// Fine-grained capability checked before a privileged action.
///
/// The wire form is snake_case (`"view_cars"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// List and inspect user accounts.
    ViewUsers,
    /// Create user accounts.
    CreateUser,
    /// Edit user accounts.
    EditUser,
    /// Delete user accounts.
    DeleteUser,

    /// List pending registrations.
    ViewRegistrations,
    /// Approve a pending registration.
    ApproveRegistration,
    /// Reject a pending registration.
    RejectRegistration,

    /// Browse the fleet.
    ViewCars,
    /// Add a car to the fleet.
    CreateCar,
    /// Edit a car.
    EditCar,
    /// Remove a car from the fleet.
    DeleteCar,

    /// List all bookings.
    ViewBookings,
    /// List the caller's own bookings.
    ViewOwnBookings,
    /// Place a booking.
    CreateBooking,
    /// Cancel a booking.
    CancelBooking,
    /// Administer any booking.
    ManageBookings,

    /// Open the dashboard.
    ViewDashboard,
    /// Read reports.
    ViewReports,
    /// Change system settings.
    ManageSystem,
}

impl Permission {
    /// Every declared permission, in declaration order.
    pub const ALL: [Permission; 19] = [
        Permission::ViewUsers,
        Permission::CreateUser,
        Permission::EditUser,
        Permission::DeleteUser,
        Permission::ViewRegistrations,
        Permission::ApproveRegistration,
        Permission::RejectRegistration,
        Permission::ViewCars,
        Permission::CreateCar,
        Permission::EditCar,
        Permission::DeleteCar,
        Permission::ViewBookings,
        Permission::ViewOwnBookings,
        Permission::CreateBooking,
        Permission::CancelBooking,
        Permission::ManageBookings,
        Permission::ViewDashboard,
        Permission::ViewReports,
        Permission::ManageSystem,
    ];

    /// Returns the wire name of this permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewUsers => "view_users",
            Permission::CreateUser => "create_user",
            Permission::EditUser => "edit_user",
            Permission::DeleteUser => "delete_user",
            Permission::ViewRegistrations => "view_registrations",
            Permission::ApproveRegistration => "approve_registration",
            Permission::RejectRegistration => "reject_registration",
            Permission::ViewCars => "view_cars",
            Permission::CreateCar => "create_car",
            Permission::EditCar => "edit_car",
            Permission::DeleteCar => "delete_car",
            Permission::ViewBookings => "view_bookings",
            Permission::ViewOwnBookings => "view_own_bookings",
            Permission::CreateBooking => "create_booking",
            Permission::CancelBooking => "cancel_booking",
            Permission::ManageBookings => "manage_bookings",
            Permission::ViewDashboard => "view_dashboard",
            Permission::ViewReports => "view_reports",
            Permission::ManageSystem => "manage_system",
        }
    }

    /// Returns the resource area this permission governs.
    pub fn area(&self) -> PermissionArea {
        match self {
            Permission::ViewUsers
            | Permission::CreateUser
            | Permission::EditUser
            | Permission::DeleteUser => PermissionArea::Users,
            Permission::ViewRegistrations
            | Permission::ApproveRegistration
            | Permission::RejectRegistration => PermissionArea::Registrations,
            Permission::ViewCars
            | Permission::CreateCar
            | Permission::EditCar
            | Permission::DeleteCar => PermissionArea::Cars,
            Permission::ViewBookings
            | Permission::ViewOwnBookings
            | Permission::CreateBooking
            | Permission::CancelBooking
            | Permission::ManageBookings => PermissionArea::Bookings,
            Permission::ViewDashboard | Permission::ViewReports | Permission::ManageSystem => {
                PermissionArea::System
            }
        }
    }

    /// Returns `true` if `value` names a declared permission.
    pub fn is_known(value: &str) -> bool {
        value.parse::<Permission>().is_ok()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownName;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// A string that is not part of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized name '{0}'")]
pub struct UnknownName(pub String);
