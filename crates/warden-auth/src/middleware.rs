//! Tower boundary-guard middleware.
//!
//! `GuardLayer` and `GuardService` wrap any inner service with the boundary
//! form of the access guard. Generic over [`SessionSource`], so the session
//! can come from a shared [`SessionStore`](crate::SessionStore) or from
//! request extensions populated by an upstream authentication layer.
//!
//! Boundary outcomes map to responses as follows:
//!
//! | outcome          | response                                   |
//! |------------------|--------------------------------------------|
//! | `RenderChildren` | inner service                              |
//! | `Redirect(to)`   | `303 See Other`, `Location: to`            |
//! | `RenderLoading`  | `503 Service Unavailable`, `Retry-After: 1` |

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::{IntoResponse, Redirect};
use http::{Request, StatusCode};
use tower::{Layer, Service};
use warden_acl::{AccessGuard, AccessRequirement, BoundaryOutcome, Session};
use warden_core::Principal;

use crate::store::SessionStore;

/// Where a boundary reads the session for an incoming request.
pub trait SessionSource: Send + Sync + 'static {
    /// The session to evaluate `req` against.
    fn session(&self, req: &Request<Body>) -> Session;
}

impl SessionSource for SessionStore {
    fn session(&self, _req: &Request<Body>) -> Session {
        SessionStore::session(self)
    }
}

/// Reads a [`Principal`] from request extensions.
///
/// A request without one is `Absent`; this source never reports `Loading`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FromExtensions;

impl SessionSource for FromExtensions {
    fn session(&self, req: &Request<Body>) -> Session {
        req.extensions()
            .get::<Principal>()
            .cloned()
            .map_or(Session::Absent, Session::present)
    }
}

/// Tower `Layer` that gates services behind an [`AccessRequirement`].
pub struct GuardLayer<S: SessionSource> {
    guard: Arc<AccessGuard>,
    source: Arc<S>,
    requirement: Arc<AccessRequirement>,
}

impl<S: SessionSource> GuardLayer<S> {
    /// Create a new guard layer for one protected region.
    pub fn new(guard: Arc<AccessGuard>, source: Arc<S>, requirement: AccessRequirement) -> Self {
        Self {
            guard,
            source,
            requirement: Arc::new(requirement),
        }
    }
}

impl<S: SessionSource> Clone for GuardLayer<S> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
            source: self.source.clone(),
            requirement: self.requirement.clone(),
        }
    }
}

impl<S: SessionSource, I> Layer<I> for GuardLayer<S> {
    type Service = GuardService<S, I>;

    fn layer(&self, inner: I) -> Self::Service {
        GuardService {
            inner,
            guard: self.guard.clone(),
            source: self.source.clone(),
            requirement: self.requirement.clone(),
        }
    }
}

/// Tower `Service` that evaluates the boundary guard before forwarding.
///
/// The session is read and the decision made on every request; nothing is
/// cached between calls.
pub struct GuardService<S: SessionSource, I> {
    inner: I,
    guard: Arc<AccessGuard>,
    source: Arc<S>,
    requirement: Arc<AccessRequirement>,
}

impl<S: SessionSource, I: Clone> Clone for GuardService<S, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            guard: self.guard.clone(),
            source: self.source.clone(),
            requirement: self.requirement.clone(),
        }
    }
}

impl<S, I> Service<Request<Body>> for GuardService<S, I>
where
    S: SessionSource,
    I: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    I::Response: IntoResponse,
    I::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let session = self.source.session(&req);
        if let Some(p) = session.principal() {
            let unknown = self.guard.resolver().unknown_roles_of(p);
            if !unknown.is_empty() {
                log::debug!("Ignoring unrecognized roles for {}: {unknown:?}", p.subject);
            }
        }
        let outcome = self.guard.boundary(&session, &self.requirement);

        Box::pin(async move {
            match outcome {
                BoundaryOutcome::RenderChildren => {
                    let resp = inner
                        .call(req)
                        .await
                        .unwrap_or_else(|infallible| match infallible {});
                    Ok(resp.into_response())
                }
                BoundaryOutcome::Redirect(target) => {
                    log::debug!("Boundary denied {} ({session}) → {target}", req.uri());
                    Ok(Redirect::to(&target).into_response())
                }
                BoundaryOutcome::RenderLoading => Ok(loading_response()),
            }
        })
    }
}

/// Build a 503 response asking the client to retry once identity resolves.
fn loading_response() -> axum::response::Response {
    let body = serde_json::json!({
        "error": {
            "category": "authorization",
            "message": "identity is still loading",
        }
    });

    (
        StatusCode::SERVICE_UNAVAILABLE,
        [
            (http::header::CONTENT_TYPE, "application/json"),
            (http::header::RETRY_AFTER, "1"),
        ],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response()
}
