//! Navigation guards.
//!
//! A guard decides whether the current session may enter a route. Guards
//! never fail: every evaluation ends in [`GuardOutcome::Allow`] or a
//! redirect. The two redirect targets are deliberately different so the
//! UI can tell "not signed in" (go to the sign-in page) from "signed in
//! without privilege" (go back to the default route).

use std::future::Future;
use std::sync::Arc;

use mindlink_session::Authenticator;
use tracing::debug;

/// Decision for one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(String),
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Something that can veto entering `path`.
pub trait Guard: Send + Sync {
    fn check(&self, path: &str) -> impl Future<Output = GuardOutcome> + Send;
}

/// Requires a valid session, silently refreshing an expired one.
///
/// - no token: redirect to the sign-in route, no network call.
/// - valid token: allow.
/// - expired token: refresh through the session's single-flight, so
///   several guards evaluated at once still cause one refresh call. Allow
///   on success, redirect otherwise.
#[derive(Clone)]
pub struct AuthGuard {
    auth: Arc<dyn Authenticator>,
    login: String,
}

impl AuthGuard {
    pub fn new(auth: Arc<dyn Authenticator>, login: impl Into<String>) -> Self {
        Self {
            auth,
            login: login.into(),
        }
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.auth.as_ref()
    }
}

impl Guard for AuthGuard {
    async fn check(&self, path: &str) -> GuardOutcome {
        if self.auth.access_token().is_none() {
            debug!(path, "no token, redirecting to sign-in");
            return GuardOutcome::Redirect(self.login.clone());
        }
        if !self.auth.is_token_expired() {
            return GuardOutcome::Allow;
        }

        debug!(path, "token expired, attempting silent refresh");
        if self.auth.refresh().await {
            GuardOutcome::Allow
        } else {
            debug!(path, "silent refresh failed, redirecting to sign-in");
            GuardOutcome::Redirect(self.login.clone())
        }
    }
}

/// [`AuthGuard`] plus the admin flag. A signed-in user without it is sent
/// to `fallback` rather than the sign-in page.
#[derive(Clone)]
pub struct AdminGuard {
    inner: AuthGuard,
    fallback: String,
}

impl AdminGuard {
    pub fn new(inner: AuthGuard, fallback: impl Into<String>) -> Self {
        Self {
            inner,
            fallback: fallback.into(),
        }
    }
}

impl Guard for AdminGuard {
    async fn check(&self, path: &str) -> GuardOutcome {
        let outcome = self.inner.check(path).await;
        if !outcome.is_allowed() {
            return outcome;
        }

        let is_admin = self
            .inner
            .authenticator()
            .current_user()
            .is_some_and(|user| user.is_admin);
        if is_admin {
            GuardOutcome::Allow
        } else {
            debug!(path, "admin route denied to non-admin user");
            GuardOutcome::Redirect(self.fallback.clone())
        }
    }
}
