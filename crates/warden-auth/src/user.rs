//! Principal extraction helpers for HTTP request parts.

use warden_core::Principal;

/// Extract the [`Principal`] from HTTP request `Parts`, if present.
///
/// An upstream authentication layer is expected to have inserted it into
/// the request extensions.
pub fn principal_from_parts(parts: &http::request::Parts) -> Option<&Principal> {
    parts.extensions.get::<Principal>()
}

/// Extract the principal's subject from HTTP request `Parts`.
///
/// Returns `"anonymous"` if no principal is present.
pub fn subject_from_parts(parts: &http::request::Parts) -> &str {
    parts
        .extensions
        .get::<Principal>()
        .map(|p| p.subject.as_str())
        .unwrap_or("anonymous")
}
