//! Identity/session store.
//!
//! [`SessionStore`] owns the current [`Session`] and is the only writer.
//! Readers get whole snapshots: a refresh replaces the value atomically, so
//! a guard sees either the old session or the new one, never a mix.
//!
//! # Usage
//!
//! ```rust
//! use warden_acl::Session;
//! use warden_auth::SessionStore;
//! use warden_core::Principal;
//!
//! let store = SessionStore::new();
//! assert_eq!(store.session(), Session::Absent);
//!
//! store.sign_in(Principal::new("u-1"));
//! assert!(store.session().principal().is_some());
//!
//! store.sign_out();
//! assert_eq!(store.session(), Session::Absent);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use warden_acl::Session;
use warden_core::Principal;

use crate::{AuthError, IdentityProvider};

/// Thread-safe handle on the current session.
///
/// Cheap to clone (Arc internals). Changes are broadcast to all
/// subscribers via a watch channel.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    tx: watch::Sender<Session>,
}

impl SessionStore {
    /// Create a store with no principal.
    pub fn new() -> Self {
        Self::with_session(Session::Absent)
    }

    /// Create a store whose identity is still being fetched.
    pub fn loading() -> Self {
        Self::with_session(Session::Loading)
    }

    fn with_session(session: Session) -> Self {
        let (tx, _rx) = watch::channel(session);
        Self {
            inner: Arc::new(SessionStoreInner { tx }),
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.inner.tx.borrow().clone()
    }

    /// Replace the current session.
    pub fn set(&self, session: Session) {
        log::debug!("Session → {session}");
        self.inner.tx.send_replace(session);
    }

    /// Record a successful authentication.
    pub fn sign_in(&self, principal: Principal) {
        log::info!("Signed in: {}", principal.subject);
        self.set(Session::present(principal));
    }

    /// Clear the principal (logout or session expiry).
    pub fn sign_out(&self) {
        if let Some(p) = self.inner.tx.borrow().principal() {
            log::info!("Signed out: {}", p.subject);
        }
        self.set(Session::Absent);
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.tx.subscribe()
    }

    /// Re-fetch the identity from `provider`.
    ///
    /// With no principal yet, the session reads `Loading` while the fetch is
    /// in flight. A present principal stays visible until the result replaces
    /// it in a single write.
    ///
    /// On failure the error is returned. Client errors (missing or expired
    /// credentials) clear the session. Transient errors keep a present
    /// principal, and otherwise leave the session `Absent`.
    pub async fn refresh<P>(&self, provider: &P) -> Result<Session, AuthError>
    where
        P: IdentityProvider + ?Sized,
    {
        let previous = self.session();
        if previous.principal().is_none() {
            self.set(Session::Loading);
        }
        match provider.fetch().await {
            Ok(principal) => {
                let session = Session::from(principal);
                self.set(session.clone());
                Ok(session)
            }
            Err(e) if e.is_client_error() => {
                log::info!("Identity refresh rejected: {e}");
                self.set(Session::Absent);
                Err(e)
            }
            Err(e) => {
                log::warn!("Identity refresh failed: {e}");
                let restored = match previous {
                    Session::Present(_) => previous,
                    _ => Session::Absent,
                };
                self.set(restored);
                Err(e)
            }
        }
    }

    /// Wait until the session leaves `Loading`, or `timeout` elapses.
    pub async fn wait_resolved(&self, timeout: Duration) -> Result<Session, AuthError> {
        let mut rx = self.subscribe();
        let result = tokio::time::timeout(timeout, rx.wait_for(Session::is_resolved)).await;
        match result {
            Ok(Ok(session)) => Ok(session.clone()),
            // The sender lives in `self`, so the channel cannot close here.
            Ok(Err(_closed)) => Ok(self.session()),
            Err(_elapsed) => Err(AuthError::Timeout(timeout)),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.session())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use warden_acl::{AccessGuard, AccessRequirement, BoundaryOutcome};

    struct FixedProvider(Result<Option<Principal>, fn() -> AuthError>);

    impl IdentityProvider for FixedProvider {
        fn fetch(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<Option<Principal>, AuthError>> + Send + '_>>
        {
            let result = match &self.0 {
                Ok(p) => Ok(p.clone()),
                Err(make) => Err(make()),
            };
            Box::pin(async move { result })
        }
    }

    /// Records what the store and a boundary guard see mid-fetch.
    struct ObservingProvider {
        store: SessionStore,
        seen: std::sync::Mutex<Option<(Session, BoundaryOutcome)>>,
    }

    impl ObservingProvider {
        fn new(store: &SessionStore) -> Self {
            Self {
                store: store.clone(),
                seen: std::sync::Mutex::new(None),
            }
        }

        fn seen(&self) -> (Session, BoundaryOutcome) {
            self.seen.lock().unwrap().clone().unwrap()
        }
    }

    impl IdentityProvider for ObservingProvider {
        fn fetch(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<Option<Principal>, AuthError>> + Send + '_>>
        {
            Box::pin(async move {
                let session = self.store.session();
                let outcome = AccessGuard::default().boundary(&session, &AccessRequirement::new());
                *self.seen.lock().unwrap() = Some((session, outcome));
                Ok(Some(Principal::new("seen")))
            })
        }
    }

    #[test]
    fn test_store_initial_states() {
        assert_eq!(SessionStore::new().session(), Session::Absent);
        assert_eq!(SessionStore::loading().session(), Session::Loading);
    }

    #[test]
    fn test_sign_in_and_out() {
        let store = SessionStore::new();
        store.sign_in(Principal::new("u-1").with_raw_roles(["User"]));
        let session = store.session();
        assert_eq!(session.principal().map(|p| p.subject.as_str()), Some("u-1"));

        store.sign_out();
        assert_eq!(store.session(), Session::Absent);
    }

    #[test]
    fn test_clone_shares_session() {
        let a = SessionStore::new();
        let b = a.clone();
        a.sign_in(Principal::new("shared"));
        assert!(b.session().principal().is_some());
    }

    #[test]
    fn test_subscribe_sees_latest() {
        let store = SessionStore::loading();
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), Session::Loading);
        store.sign_in(Principal::new("x"));
        assert!(rx.borrow_and_update().principal().is_some());
    }

    #[tokio::test]
    async fn test_refresh_present() {
        let store = SessionStore::new();
        let provider = FixedProvider(Ok(Some(Principal::new("p-1"))));
        let session = store.refresh(&provider).await.unwrap();
        assert!(session.principal().is_some());
        assert_eq!(store.session(), session);
    }

    #[tokio::test]
    async fn test_refresh_absent() {
        let store = SessionStore::new();
        store.sign_in(Principal::new("old"));
        let provider = FixedProvider(Ok(None));
        let session = store.refresh(&provider).await.unwrap();
        assert_eq!(session, Session::Absent);
        assert_eq!(store.session(), Session::Absent);
    }

    #[tokio::test]
    async fn test_refresh_expired_clears_session() {
        let store = SessionStore::new();
        store.sign_in(Principal::new("old"));
        let provider = FixedProvider(Err(|| AuthError::Expired));
        let err = store.refresh(&provider).await.unwrap_err();
        assert!(matches!(err, AuthError::Expired));
        assert_eq!(store.session(), Session::Absent);
    }

    #[tokio::test]
    async fn test_refresh_transient_failure_keeps_principal() {
        let store = SessionStore::new();
        store.sign_in(Principal::new("admin").with_raw_roles(["Admin"]));
        let provider = FixedProvider(Err(|| AuthError::ProviderUnavailable("503".into())));
        let err = store.refresh(&provider).await.unwrap_err();
        assert!(!err.is_client_error());
        assert_eq!(
            store.session().principal().map(|p| p.subject.as_str()),
            Some("admin")
        );
    }

    #[tokio::test]
    async fn test_refresh_transient_failure_without_principal_is_absent() {
        let store = SessionStore::loading();
        let provider = FixedProvider(Err(|| AuthError::Timeout(Duration::from_secs(1))));
        assert!(store.refresh(&provider).await.is_err());
        assert_eq!(store.session(), Session::Absent);
    }

    #[tokio::test]
    async fn test_first_fetch_is_loading_while_in_flight() {
        let store = SessionStore::new();
        let provider = ObservingProvider::new(&store);
        store.refresh(&provider).await.unwrap();

        let (session, outcome) = provider.seen();
        assert_eq!(session, Session::Loading);
        assert_eq!(outcome, BoundaryOutcome::RenderLoading);
        assert!(store.session().principal().is_some());
    }

    #[tokio::test]
    async fn test_refresh_of_present_keeps_principal_in_flight() {
        let store = SessionStore::new();
        store.sign_in(Principal::new("admin").with_raw_roles(["Admin"]));
        let provider = ObservingProvider::new(&store);
        store.refresh(&provider).await.unwrap();

        let (session, outcome) = provider.seen();
        assert_eq!(
            session.principal().map(|p| p.subject.as_str()),
            Some("admin")
        );
        assert_eq!(outcome, BoundaryOutcome::RenderChildren);
        assert_eq!(
            store.session().principal().map(|p| p.subject.as_str()),
            Some("seen")
        );
    }

    #[tokio::test]
    async fn test_wait_resolved_success() {
        let store = SessionStore::loading();
        let s = store.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            s.sign_in(Principal::new("late"));
        });

        let session = store.wait_resolved(Duration::from_secs(1)).await.unwrap();
        assert!(session.principal().is_some());
    }

    #[tokio::test]
    async fn test_wait_resolved_timeout() {
        let store = SessionStore::loading();
        let err = store
            .wait_resolved(Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_wait_resolved_already_resolved() {
        let store = SessionStore::new();
        let session = store.wait_resolved(Duration::from_millis(10)).await.unwrap();
        assert_eq!(session, Session::Absent);
    }

    // Compile-time check: SessionStore must be Send + Sync
    fn _assert_send_sync<T: Send + Sync>() {}
    #[test]
    fn test_session_store_send_sync() {
        _assert_send_sync::<SessionStore>();
        _assert_send_sync::<Session>();
    }
}
