//! Session state, configuration and the read-only session context.

use mindlink_protocol::CurrentUser;
use mindlink_tick::TickConfig;
use tokio::sync::watch;

/// Lifecycle state of the client session.
///
/// ```text
///                  login / register OK
/// Unauthenticated ─────────────────────→ Authenticated
///        ↑                                   │    ↑
///        │ logout / refresh failed           │    │ refresh OK
///        │                                   ▼    │
///        └──────────────────────────────── Refreshing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No valid access token is held.
    Unauthenticated,
    /// A valid access token is held.
    Authenticated,
    /// A refresh request is in flight. Only one exists at a time.
    Refreshing,
}

impl SessionState {
    /// Whether a session is being held (authenticated or mid-refresh).
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }
}

/// Paths of the unauthenticated auth endpoints, relative to the API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub login: String,
    pub register: String,
    pub refresh: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login/".into(),
            register: "/auth/register/".into(),
            refresh: "/auth/refresh/".into(),
        }
    }
}

impl AuthEndpoints {
    /// `true` if `path` targets one of the auth endpoints. Such requests
    /// never carry a bearer token and never trigger a refresh.
    ///
    /// Matches on containment so that prefixed paths
    /// (`/api/auth/login/`) and query strings are covered.
    pub fn is_public(&self, path: &str) -> bool {
        [&self.login, &self.register, &self.refresh]
            .iter()
            .any(|endpoint| path.contains(endpoint.as_str()))
    }
}

/// Configuration for a [`SessionManager`](crate::SessionManager).
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub endpoints: AuthEndpoints,
    /// Keep-alive refresh cadence. Defaults to 15 minutes.
    pub keepalive: TickConfig,
}

/// What observers see of the session at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// `None` exactly when no valid access token is held.
    pub user: Option<CurrentUser>,
}

impl SessionSnapshot {
    pub(crate) fn signed_out() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            user: None,
        }
    }
}

/// Read-only, observable view of the session.
///
/// Cheap to clone. Every clone sees the same updates; only the session
/// manager can publish them.
#[derive(Debug, Clone)]
pub struct SessionContext {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionContext {
    pub(crate) fn new(rx: watch::Receiver<SessionSnapshot>) -> Self {
        Self { rx }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.rx.borrow().state
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.rx.borrow().user.clone()
    }

    /// Waits for the next published change.
    ///
    /// # Errors
    /// Returns `Err` once the session manager has been dropped.
    pub async fn changed(&mut self) -> Result<SessionSnapshot, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_public_matches_auth_endpoints() {
        let endpoints = AuthEndpoints::default();

        assert!(endpoints.is_public("/auth/login/"));
        assert!(endpoints.is_public("/api/auth/register/"));
        assert!(endpoints.is_public("/auth/refresh/?x=1"));
    }

    #[test]
    fn test_is_public_rejects_protected_paths() {
        let endpoints = AuthEndpoints::default();

        assert!(!endpoints.is_public("/ideas/"));
        assert!(!endpoints.is_public("/auth/me/"));
        assert!(!endpoints.is_public("/auth/login"));
    }

    #[test]
    fn test_state_is_active() {
        assert!(!SessionState::Unauthenticated.is_active());
        assert!(SessionState::Authenticated.is_active());
        assert!(SessionState::Refreshing.is_active());
    }
}
