//! Integration tests for guards and navigation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use futures_util::future::BoxFuture;
use mindlink_protocol::CurrentUser;
use mindlink_router::{
    Access, AdminGuard, AuthGuard, Guard, GuardOutcome, Navigator, Route, RouteTable, RouterError,
};
use mindlink_session::{
    ACCESS_TOKEN_KEY, Authenticator, KeyValueStore, MemoryStore, REFRESH_TOKEN_KEY, SessionManager,
};
use mindlink_transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};

// =========================================================================
// Scripted session
// =========================================================================

struct ScriptedAuth {
    has_token: bool,
    expired: AtomicBool,
    refresh_succeeds: bool,
    admin: bool,
    refreshes: AtomicUsize,
}

impl ScriptedAuth {
    fn signed_out() -> Arc<Self> {
        Arc::new(Self::new(false, false, false, false))
    }

    fn signed_in(admin: bool) -> Arc<Self> {
        Arc::new(Self::new(true, false, false, admin))
    }

    fn expired(refresh_succeeds: bool) -> Arc<Self> {
        Arc::new(Self::new(true, true, refresh_succeeds, false))
    }

    fn new(has_token: bool, expired: bool, refresh_succeeds: bool, admin: bool) -> Self {
        Self {
            has_token,
            expired: AtomicBool::new(expired),
            refresh_succeeds,
            admin,
            refreshes: AtomicUsize::new(0),
        }
    }

    fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl Authenticator for ScriptedAuth {
    fn access_token(&self) -> Option<String> {
        self.has_token.then(|| "token".to_string())
    }

    fn is_token_expired(&self) -> bool {
        !self.has_token || self.expired.load(Ordering::SeqCst)
    }

    fn current_user(&self) -> Option<CurrentUser> {
        (!self.is_token_expired()).then(|| CurrentUser {
            username: Some("alice".into()),
            id: None,
            exp: chrono::Utc::now() + chrono::Duration::hours(1),
            is_admin: self.admin,
        })
    }

    fn refresh(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if self.refresh_succeeds {
                self.expired.store(false, Ordering::SeqCst);
            }
            self.refresh_succeeds
        })
    }
}

fn auth_guard(auth: &Arc<ScriptedAuth>) -> AuthGuard {
    AuthGuard::new(auth.clone(), "/auth")
}

fn admin_guard(auth: &Arc<ScriptedAuth>) -> AdminGuard {
    AdminGuard::new(auth_guard(auth), "/")
}

// =========================================================================
// AuthGuard
// =========================================================================

#[tokio::test]
async fn test_auth_guard_without_token_redirects_to_sign_in() {
    let auth = ScriptedAuth::signed_out();

    let outcome = auth_guard(&auth).check("/graph").await;

    assert_eq!(outcome, GuardOutcome::Redirect("/auth".into()));
    assert_eq!(auth.refreshes(), 0);
}

#[tokio::test]
async fn test_auth_guard_allows_valid_token() {
    let auth = ScriptedAuth::signed_in(false);

    assert!(auth_guard(&auth).check("/graph").await.is_allowed());
    assert_eq!(auth.refreshes(), 0);
}

#[tokio::test]
async fn test_auth_guard_refreshes_expired_token() {
    let auth = ScriptedAuth::expired(true);

    assert!(auth_guard(&auth).check("/ideas").await.is_allowed());
    assert_eq!(auth.refreshes(), 1);
}

#[tokio::test]
async fn test_auth_guard_redirects_when_refresh_fails() {
    let auth = ScriptedAuth::expired(false);

    let outcome = auth_guard(&auth).check("/ideas").await;

    assert_eq!(outcome, GuardOutcome::Redirect("/auth".into()));
    assert_eq!(auth.refreshes(), 1);
}

// =========================================================================
// AdminGuard
// =========================================================================

#[tokio::test]
async fn test_admin_guard_redirects_non_admin_home() {
    let auth = ScriptedAuth::signed_in(false);

    let outcome = admin_guard(&auth).check("/admin/users").await;

    assert_eq!(outcome, GuardOutcome::Redirect("/".into()));
}

#[tokio::test]
async fn test_admin_guard_redirects_signed_out_to_sign_in() {
    let auth = ScriptedAuth::signed_out();

    let outcome = admin_guard(&auth).check("/admin/users").await;

    assert_eq!(outcome, GuardOutcome::Redirect("/auth".into()));
}

#[tokio::test]
async fn test_admin_guard_allows_admin() {
    let auth = ScriptedAuth::signed_in(true);

    assert!(admin_guard(&auth).check("/admin/training").await.is_allowed());
}

// =========================================================================
// Navigator
// =========================================================================

#[tokio::test]
async fn test_navigate_signed_out_lands_on_sign_in() {
    let navigator = Navigator::new(ScriptedAuth::signed_out());

    let nav = navigator.navigate("/dashboard").await.unwrap();

    assert_eq!(nav.path, "/auth");
    assert_eq!(nav.redirects, vec!["/auth".to_string()]);
}

#[tokio::test]
async fn test_navigate_root_goes_to_graph() {
    let navigator = Navigator::new(ScriptedAuth::signed_in(false));

    let nav = navigator.navigate("/").await.unwrap();

    assert_eq!(nav.path, "/graph");
    assert!(nav.is_redirected());
}

#[tokio::test]
async fn test_navigate_admin_route_as_user_ends_on_default_route() {
    let navigator = Navigator::new(ScriptedAuth::signed_in(false));

    let nav = navigator.navigate("/admin/users").await.unwrap();

    assert_eq!(nav.redirects, vec!["/".to_string(), "/graph".to_string()]);
    assert_eq!(nav.path, "/graph");
}

#[tokio::test]
async fn test_navigate_allowed_route_has_no_redirects() {
    let navigator = Navigator::new(ScriptedAuth::signed_in(true));

    let nav = navigator.navigate("/admin/training").await.unwrap();

    assert_eq!(nav.path, "/admin/training");
    assert!(!nav.is_redirected());
}

#[tokio::test]
async fn test_navigate_unknown_path_goes_to_sign_in() {
    let navigator = Navigator::new(ScriptedAuth::signed_in(false));

    let nav = navigator.navigate("/does-not-exist").await.unwrap();

    assert_eq!(nav.path, "/auth");
}

#[tokio::test]
async fn test_navigate_detects_redirect_loop() {
    // The sign-in route itself requires a session: nobody can ever land.
    let table = RouteTable::new(
        vec![
            Route::new("auth", Access::Authenticated),
            Route::new("graph", Access::Authenticated),
        ],
        "/auth",
        "/graph",
    );
    let navigator = Navigator::with_table(ScriptedAuth::signed_out(), table);

    let err = navigator.navigate("/graph").await.unwrap_err();

    assert!(matches!(err, RouterError::RedirectLoop { .. }));
}

// =========================================================================
// Guards share the session's single-flight refresh
// =========================================================================

struct SlowRefreshApi {
    refreshes: AtomicUsize,
    access: String,
}

impl HttpTransport for SlowRefreshApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        assert_eq!(request.path, "/auth/refresh/");
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(250)).await;
        Ok(ApiResponse::new(
            200,
            format!(r#"{{"access":"{}"}}"#, self.access),
        ))
    }
}

fn jwt(exp_offset_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + exp_offset_secs;
    format!(
        "h.{}.s",
        URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"user_id":1}}"#))
    )
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_guards_issue_one_refresh() {
    let api = Arc::new(SlowRefreshApi {
        refreshes: AtomicUsize::new(0),
        access: jwt(3600),
    });
    let store = Arc::new(MemoryStore::new());
    store.set(ACCESS_TOKEN_KEY, &jwt(-30)).unwrap();
    store.set(REFRESH_TOKEN_KEY, "r").unwrap();
    let session = Arc::new(SessionManager::new(Arc::clone(&api), store));
    let navigator = Navigator::new(session.clone());

    let (graph, ideas) = tokio::join!(navigator.navigate("/graph"), navigator.navigate("/ideas"));

    assert_eq!(graph.unwrap().path, "/graph");
    assert_eq!(ideas.unwrap().path, "/ideas");
    assert_eq!(api.refreshes.load(Ordering::SeqCst), 1);
    assert!(!session.is_token_expired());
}

#[tokio::test]
async fn test_guard_without_token_makes_no_network_call() {
    let api = Arc::new(SlowRefreshApi {
        refreshes: AtomicUsize::new(0),
        access: jwt(3600),
    });
    let session = Arc::new(SessionManager::new(
        Arc::clone(&api),
        Arc::new(MemoryStore::new()),
    ));

    let outcome = AuthGuard::new(session, "/auth").check("/graph").await;

    assert_eq!(outcome, GuardOutcome::Redirect("/auth".into()));
    assert_eq!(api.refreshes.load(Ordering::SeqCst), 0);
}
