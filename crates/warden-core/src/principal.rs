//! The authenticated subject.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::role::Role;

/// Claim names that carry role assignments, in lookup order.
///
/// The last entry is the long-form claim URI some identity servers emit
/// instead of a short `role` claim.
const ROLE_CLAIMS: [&str; 3] = [
    "roles",
    "role",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
];

/// An authenticated subject and the role names assigned to it.
///
/// Roles are kept as the raw strings received from the identity provider.
/// They are filtered down to recognized [`Role`] values only when they are
/// evaluated, so an unrecognized name grants nothing and is never an error.
///
/// "No principal" is modelled as `Option<&Principal>::None` by callers, which
/// is distinct from a principal with an empty role list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable subject identifier (the `sub` claim).
    pub subject: String,
    /// Email address, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Raw role names, possibly including unrecognized or duplicate values.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Principal {
    /// Creates a principal with no roles.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: None,
            roles: Vec::new(),
        }
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Adds a recognized role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role.as_str().to_string());
        self
    }

    /// Adds raw role names as received from an external source.
    pub fn with_raw_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Builds a principal from decoded token claims.
    ///
    /// Returns `None` when the `sub` claim is missing. Role claims may be a
    /// single string or an array of strings; non-string entries are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_core::Principal;
    ///
    /// let claims = serde_json::json!({
    ///     "sub": "u-17",
    ///     "email": "kim@example.com",
    ///     "role": ["Guest", "Superuser"],
    /// });
    /// let p = Principal::from_claims(&claims).unwrap();
    /// assert_eq!(p.roles, vec!["Guest", "Superuser"]);
    /// ```
    pub fn from_claims(claims: &Value) -> Option<Self> {
        let subject = claims.get("sub")?.as_str()?.to_string();
        let email = claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut roles = Vec::new();
        for claim in ROLE_CLAIMS {
            match claims.get(claim) {
                Some(Value::String(s)) => roles.push(s.clone()),
                Some(Value::Array(items)) => {
                    roles.extend(items.iter().filter_map(Value::as_str).map(str::to_string))
                }
                _ => {}
            }
        }

        Some(Self {
            subject,
            email,
            roles,
        })
    }
}
