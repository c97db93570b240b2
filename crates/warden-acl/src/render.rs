//! Inline guarding of renderable units.
//!
//! A [`Renderable`] is anything that can produce output for a viewer.
//! [`Guarded`] composes an [`AccessRequirement`] with a renderable and is
//! itself renderable, so access control can be retrofitted onto an existing
//! unit without touching its internals:
//!
//! ```rust
//! use warden_acl::{AccessGuard, AccessRequirement, Guarded, RenderContext, RenderFn, Renderable};
//! use warden_core::{Permission, Principal};
//!
//! let approve = RenderFn::new(|_: &RenderContext<'_>| Some("<button>Approve</button>".to_string()));
//! let gated = Guarded::new(
//!     AccessRequirement::new().permissions([Permission::ApproveRegistration]),
//!     approve,
//! );
//!
//! let guard = AccessGuard::default();
//! let manager = Principal::new("m-1").with_raw_roles(["Manager"]);
//! let guest = Principal::new("g-1").with_raw_roles(["Guest"]);
//!
//! assert!(gated.render(&RenderContext::new(&guard, Some(&manager))).is_some());
//! assert!(gated.render(&RenderContext::new(&guard, Some(&guest))).is_none());
//! ```
//!
//! Denial never redirects here: a guarded element renders its fallback, or
//! nothing.

use std::marker::PhantomData;

use warden_core::Principal;

use crate::enforcement::{AccessDecision, AccessGuard};
use crate::policy::AccessRequirement;
use crate::session::Session;

/// The viewer a unit is rendered for.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    guard: &'a AccessGuard,
    principal: Option<&'a Principal>,
}

impl<'a> RenderContext<'a> {
    /// Render for `principal` (`None` when unauthenticated).
    pub fn new(guard: &'a AccessGuard, principal: Option<&'a Principal>) -> Self {
        Self { guard, principal }
    }

    /// Render for the current session. A loading session has no principal.
    pub fn from_session(guard: &'a AccessGuard, session: &'a Session) -> Self {
        Self::new(guard, session.principal())
    }

    /// The guard used for inline checks.
    pub fn guard(&self) -> &'a AccessGuard {
        self.guard
    }

    /// The viewer, if authenticated.
    pub fn principal(&self) -> Option<&'a Principal> {
        self.principal
    }

    /// Inline check of `requirement` for this viewer.
    pub fn check(&self, requirement: &AccessRequirement) -> AccessDecision {
        self.guard.check(self.principal, requirement)
    }
}

/// A unit that renders output for a viewer. `None` renders nothing.
pub trait Renderable {
    /// What rendering produces.
    type Output;

    /// Render for the viewer in `cx`.
    fn render(&self, cx: &RenderContext<'_>) -> Option<Self::Output>;
}

impl<R: Renderable + ?Sized> Renderable for &R {
    type Output = R::Output;

    fn render(&self, cx: &RenderContext<'_>) -> Option<Self::Output> {
        (**self).render(cx)
    }
}

/// Renders nothing. The default fallback of [`Guarded`].
pub struct Nothing<O>(PhantomData<fn() -> O>);

impl<O> Nothing<O> {
    /// A unit that renders nothing.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<O> Default for Nothing<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Renderable for Nothing<O> {
    type Output = O;

    fn render(&self, _cx: &RenderContext<'_>) -> Option<O> {
        None
    }
}

/// Adapts a closure into a [`Renderable`].
pub struct RenderFn<F, O> {
    f: F,
    _output: PhantomData<fn() -> O>,
}

impl<F, O> RenderFn<F, O>
where
    F: Fn(&RenderContext<'_>) -> Option<O>,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _output: PhantomData,
        }
    }
}

impl<F, O> Renderable for RenderFn<F, O>
where
    F: Fn(&RenderContext<'_>) -> Option<O>,
{
    type Output = O;

    fn render(&self, cx: &RenderContext<'_>) -> Option<O> {
        (self.f)(cx)
    }
}

/// A renderable gated by an inline access check.
///
/// On `Allow` the wrapped unit renders; on `Deny` the fallback does.
pub struct Guarded<R: Renderable, F = Nothing<<R as Renderable>::Output>> {
    requirement: AccessRequirement,
    inner: R,
    fallback: F,
}

impl<R: Renderable> Guarded<R> {
    /// Gate `inner` behind `requirement`, rendering nothing on denial.
    pub fn new(requirement: AccessRequirement, inner: R) -> Self {
        Self {
            requirement,
            inner,
            fallback: Nothing::new(),
        }
    }
}

impl<R: Renderable, F> Guarded<R, F> {
    /// Render `fallback` instead of nothing on denial.
    pub fn or_else<G>(self, fallback: G) -> Guarded<R, G>
    where
        G: Renderable<Output = R::Output>,
    {
        Guarded {
            requirement: self.requirement,
            inner: self.inner,
            fallback,
        }
    }

    /// The requirement checked before rendering.
    pub fn requirement(&self) -> &AccessRequirement {
        &self.requirement
    }

    /// The wrapped unit.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R, F> Renderable for Guarded<R, F>
where
    R: Renderable,
    F: Renderable<Output = R::Output>,
{
    type Output = R::Output;

    fn render(&self, cx: &RenderContext<'_>) -> Option<Self::Output> {
        match cx.check(&self.requirement) {
            AccessDecision::Allow => self.inner.render(cx),
            AccessDecision::Deny(_) => self.fallback.render(cx),
        }
    }
}
