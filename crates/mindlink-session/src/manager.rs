//! The session manager: owns the tokens and every session transition.
//!
//! Everything that changes the session goes through here: login,
//! registration, logout and refresh. Everything else (the request pipeline,
//! route guards, UI) only reads it, through [`Authenticator`] or a
//! [`SessionContext`].
//!
//! # Concurrency
//!
//! `SessionManager` is meant to be shared behind an `Arc`. Token reads and
//! writes go through the store's own lock and are never held across an
//! await. Refresh is coalesced with [`SingleFlight`]: however many callers
//! ask for a refresh at once, one request reaches the API and all of them
//! receive its result.

use chrono::Utc;
use futures_util::future::BoxFuture;
use mindlink_protocol::{
    Codec, Credentials, CurrentUser, ErrorBody, JsonCodec, RefreshRequest, RefreshResponse,
    TokenClaims, TokenPair,
};
use mindlink_transport::{ApiRequest, ApiResponse, HttpTransport};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    Authenticator, KeyValueStore, SessionConfig, SessionContext, SessionError, SessionSnapshot,
    SessionState, SingleFlight, TokenStore,
};

/// Owns the persisted tokens and drives the session state machine.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ login()/register() ──→ refresh_token() ──→ logout()
///   │              │                     │    │             │
///   ▼              ▼                     │    ▼ (failure)   ▼
/// [from store] [Authenticated] ←─ OK ────┘ [Unauthenticated]
/// ```
pub struct SessionManager<T: HttpTransport, S: KeyValueStore> {
    transport: T,
    tokens: TokenStore<S>,
    config: SessionConfig,
    codec: JsonCodec,
    snapshot: watch::Sender<SessionSnapshot>,
    refresh: SingleFlight<bool>,
}

impl<T: HttpTransport, S: KeyValueStore> SessionManager<T, S> {
    /// Creates a manager with the default configuration.
    pub fn new(transport: T, store: S) -> Self {
        Self::with_config(transport, store, SessionConfig::default())
    }

    /// Creates a manager, restoring the session from whatever tokens the
    /// store already holds.
    ///
    /// A stored access token that is still valid restores an authenticated
    /// session. An expired or unreadable one leaves the session
    /// unauthenticated, but the tokens stay put so a guard or the pipeline
    /// can still attempt a silent refresh with the stored refresh token.
    pub fn with_config(transport: T, store: S, config: SessionConfig) -> Self {
        let tokens = TokenStore::new(store);
        let initial = stored_snapshot(&tokens);
        if let Some(user) = &initial.user {
            debug!(username = ?user.username, "session restored from store");
        }

        Self {
            transport,
            tokens,
            config,
            codec: JsonCodec,
            snapshot: watch::Sender::new(initial),
            refresh: SingleFlight::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A read-only, observable view of this session.
    pub fn context(&self) -> SessionContext {
        SessionContext::new(self.snapshot.subscribe())
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.snapshot.borrow().user.clone()
    }

    /// Whether a refresh request is in flight right now.
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_in_flight()
    }

    // -----------------------------------------------------------------------
    // Login / register / logout
    // -----------------------------------------------------------------------

    /// Exchanges credentials for a token pair and starts a session.
    ///
    /// # Errors
    /// - [`SessionError::Rejected`] if the API refused the credentials.
    /// - [`SessionError::Unreachable`] if the API couldn't be reached.
    /// - [`SessionError::InvalidResponse`] if the returned access token
    ///   has no readable expiry. Nothing is stored in that case.
    ///
    /// On any error the session is left exactly as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentUser, SessionError> {
        let path = self.config.endpoints.login.clone();
        let pair = self.exchange(path, username, password).await?;
        let user = self.store_pair(&pair)?;
        info!(username = ?user.username, "logged in");
        Ok(user)
    }

    /// Creates an account and starts a session with the returned tokens.
    ///
    /// Same error contract as [`login`](Self::login).
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CurrentUser, SessionError> {
        let path = self.config.endpoints.register.clone();
        let pair = self.exchange(path, username, password).await?;
        let user = self.store_pair(&pair)?;
        info!(username = ?user.username, "registered");
        Ok(user)
    }

    /// Ends the session: removes both tokens and clears the current user.
    ///
    /// Idempotent. Never fails: a store that can't delete is logged, and
    /// the in-memory session is cleared regardless.
    pub fn logout(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to remove stored tokens");
        }
        let changed = self.snapshot.send_if_modified(|snapshot| {
            let was_signed_in = snapshot.state.is_active() || snapshot.user.is_some();
            *snapshot = SessionSnapshot::signed_out();
            was_signed_in
        });
        if changed {
            info!("logged out");
        }
    }

    // -----------------------------------------------------------------------
    // Token queries
    // -----------------------------------------------------------------------

    /// The stored access token, valid or not.
    pub fn get_token(&self) -> Option<String> {
        self.tokens.access()
    }

    /// `true` if there is no access token, it can't be decoded, or its
    /// expiry has passed. Never fails.
    pub fn is_token_expired(&self) -> bool {
        self.get_token().as_deref().and_then(valid_user).is_none()
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// Exchanges the refresh token for a new access token.
    ///
    /// Resolves `true` once the new token is stored and the current user
    /// recomputed. Resolves `false` when no refresh token is held (without
    /// touching the network) or when the exchange fails, in which case the
    /// session is logged out first. Never returns an error.
    ///
    /// Concurrent calls share one request and one outcome.
    pub async fn refresh_token(&self) -> bool {
        self.refresh.run(|| self.refresh_once()).await
    }

    async fn refresh_once(&self) -> bool {
        let Some(refresh) = self.tokens.refresh() else {
            debug!("no refresh token stored, skipping refresh");
            return false;
        };

        self.snapshot.send_modify(|s| s.state = SessionState::Refreshing);
        let mut pending = SettleOnDrop {
            tokens: &self.tokens,
            snapshot: &self.snapshot,
            settled: false,
        };
        debug!("refreshing access token");

        let refreshed = match self.request_refresh(refresh).await {
            Ok(user) => {
                debug!(exp = %user.exp, "access token refreshed");
                true
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, ending session");
                self.logout();
                false
            }
        };
        pending.settled = true;
        refreshed
    }

    async fn request_refresh(&self, refresh: String) -> Result<CurrentUser, SessionError> {
        let body = self
            .codec
            .encode(&RefreshRequest { refresh })
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
        let request = ApiRequest::post(self.config.endpoints.refresh.clone()).with_json(body);
        let response = self.send(request).await?;

        let refreshed: RefreshResponse = self
            .codec
            .decode(&response.body)
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
        let user = valid_user(&refreshed.access).ok_or_else(|| {
            SessionError::InvalidResponse("refreshed access token is expired or unreadable".into())
        })?;

        match refreshed.refresh.as_deref() {
            Some(rotated) => self.tokens.set_pair(&refreshed.access, rotated)?,
            None => self.tokens.set_access(&refreshed.access)?,
        }
        self.publish_authenticated(user.clone());
        Ok(user)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn exchange(
        &self,
        path: String,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, SessionError> {
        let body = self
            .codec
            .encode(&Credentials::new(username, password))
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
        let response = self.send(ApiRequest::post(path).with_json(body)).await?;
        self.codec
            .decode(&response.body)
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))
    }

    /// Sends an auth request straight to the transport, bypassing the
    /// pipeline. Non-2xx responses become [`SessionError::Rejected`].
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| SessionError::Unreachable(e.to_string()))?;
        if response.is_success() {
            return Ok(response);
        }

        let message = self
            .codec
            .decode::<ErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.message().map(str::to_string))
            .unwrap_or_else(|| default_rejection(response.status));
        Err(SessionError::Rejected {
            status: response.status,
            message,
        })
    }

    fn store_pair(&self, pair: &TokenPair) -> Result<CurrentUser, SessionError> {
        let user = valid_user(&pair.access).ok_or_else(|| {
            SessionError::InvalidResponse("access token is expired or unreadable".into())
        })?;
        self.tokens.set_pair(&pair.access, &pair.refresh)?;
        self.publish_authenticated(user.clone());
        Ok(user)
    }

    fn publish_authenticated(&self, user: CurrentUser) {
        self.snapshot.send_replace(SessionSnapshot {
            state: SessionState::Authenticated,
            user: Some(user),
        });
    }
}

/// Leaves `Refreshing` behind if a refresh is dropped before it settles,
/// falling back to whatever the stored access token supports.
struct SettleOnDrop<'a, S: KeyValueStore> {
    tokens: &'a TokenStore<S>,
    snapshot: &'a watch::Sender<SessionSnapshot>,
    settled: bool,
}

impl<S: KeyValueStore> Drop for SettleOnDrop<'_, S> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let restored = stored_snapshot(self.tokens);
        debug!(state = ?restored.state, "refresh cancelled before completing");
        self.snapshot.send_replace(restored);
    }
}

/// The session the stored access token supports on its own.
fn stored_snapshot<S: KeyValueStore>(tokens: &TokenStore<S>) -> SessionSnapshot {
    match tokens.access().as_deref().and_then(valid_user) {
        Some(user) => SessionSnapshot {
            state: SessionState::Authenticated,
            user: Some(user),
        },
        None => SessionSnapshot::signed_out(),
    }
}

/// Projects `token` into a user if it decodes and hasn't expired yet.
fn valid_user(token: &str) -> Option<CurrentUser> {
    let claims = TokenClaims::decode(token).ok()?;
    if claims.is_expired_at(Utc::now()) {
        return None;
    }
    Some(CurrentUser::from(&claims))
}

fn default_rejection(status: u16) -> String {
    match status {
        400 | 401 => "invalid credentials".into(),
        _ => format!("request failed with status {status}"),
    }
}

impl<T: HttpTransport, S: KeyValueStore> Authenticator for SessionManager<T, S> {
    fn access_token(&self) -> Option<String> {
        self.get_token()
    }

    fn is_token_expired(&self) -> bool {
        SessionManager::is_token_expired(self)
    }

    fn current_user(&self) -> Option<CurrentUser> {
        SessionManager::current_user(self)
    }

    fn refresh(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.refresh_token())
    }
}
