//! The UI host against a real local backend and a temporary dist dir.

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use mindlink::{HostConfig, host};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Echoes back what it received, with a custom response header.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    let status = if method == Method::POST {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let payload = json!({
        "method": method.as_str(),
        "uri": uri.to_string(),
        "authorization": header("authorization"),
        "keep_alive": header("keep-alive"),
        "proxy_authorization": header("proxy-authorization"),
        "body": body,
    });
    (status, [("x-backend", "django")], axum::Json(payload)).into_response()
}

async fn spawn_backend() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn dist_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>mindlink</html>").unwrap();
    std::fs::create_dir(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("assets/app.js"), "console.log('ui')").unwrap();
    dir
}

fn config(api_url: String, dist: &Path) -> HostConfig {
    HostConfig {
        api_url,
        dist_dir: dist.to_path_buf(),
        ..HostConfig::default()
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Proxy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_proxy_keeps_api_prefix_and_query() {
    let backend = spawn_backend().await;
    let dist = dist_dir();
    let app = host::router(&config(format!("http://{backend}"), dist.path())).unwrap();

    let response = app
        .oneshot(
            Request::get("/api/ideas/search/?q=graphs")
                .header("authorization", "Bearer abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-backend"], "django");
    let echoed = body_json(response).await;
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["uri"], "/api/ideas/search/?q=graphs");
    assert_eq!(echoed["authorization"], "Bearer abc");
}

#[tokio::test]
async fn test_proxy_forwards_body_and_status() {
    let backend = spawn_backend().await;
    let dist = dist_dir();
    let app = host::router(&config(format!("http://{backend}"), dist.path())).unwrap();

    let response = app
        .oneshot(
            Request::post("/api/ideas/")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"title":"graphs"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let echoed = body_json(response).await;
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["body"], r#"{"title":"graphs"}"#);
}

#[tokio::test]
async fn test_proxy_strips_hop_by_hop_headers() {
    let backend = spawn_backend().await;
    let dist = dist_dir();
    let app = host::router(&config(format!("http://{backend}"), dist.path())).unwrap();

    let response = app
        .oneshot(
            Request::get("/api/notifications/")
                .header("keep-alive", "timeout=5")
                .header("proxy-authorization", "Basic Zm9v")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let echoed = body_json(response).await;
    assert!(echoed["keep_alive"].is_null());
    assert!(echoed["proxy_authorization"].is_null());
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    // Bind then drop, leaving a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dist = dist_dir();
    let app = host::router(&config(format!("http://{addr}"), dist.path())).unwrap();

    let response = app
        .oneshot(Request::get("/api/ideas/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// ---------------------------------------------------------------------------
// Static assets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_serves_static_asset() {
    let dist = dist_dir();
    let app = host::router(&config("http://127.0.0.1:9".into(), dist.path())).unwrap();

    let response = app
        .oneshot(Request::get("/assets/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "console.log('ui')");
}

#[tokio::test]
async fn test_unknown_paths_render_index() {
    let dist = dist_dir();
    let app = host::router(&config("http://127.0.0.1:9".into(), dist.path())).unwrap();

    for path in ["/", "/graph", "/ideas/42/edit"] {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "path {path}");
        assert_eq!(body_text(response).await, "<html>mindlink</html>");
    }
}
