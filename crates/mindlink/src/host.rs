//! The UI host: proxies `/api/*` to the backend and serves the built
//! single-page app, with `index.html` for any unknown path.

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use axum::routing::any;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{HostConfig, HostError};

/// Largest request body forwarded to the backend.
pub const MAX_PROXY_BODY: usize = 16 * 1024 * 1024;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Headers that describe one hop, not the message.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
    api_url: String,
}

/// Builds the host's router.
///
/// # Errors
/// [`HostError::Client`] if the outbound HTTP client can't be built.
pub fn router(config: &HostConfig) -> Result<Router, HostError> {
    let client = reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(HostError::Client)?;
    let state = ProxyState {
        client,
        api_url: config.api_url.clone(),
    };

    let index = config.dist_dir.join("index.html");
    let assets = ServeDir::new(&config.dist_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(index));

    Ok(Router::new()
        .route("/api", any(proxy))
        .route("/api/{*path}", any(proxy))
        .with_state(state)
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http()))
}

/// Binds `config.addr()` and serves until Ctrl-C.
pub async fn serve(config: HostConfig) -> Result<(), HostError> {
    let app = router(&config)?;
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        api_url = %config.api_url,
        dist_dir = %config.dist_dir.display(),
        "mindlink host listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("mindlink host stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Proxy
// ---------------------------------------------------------------------------

/// Forwards the request as is, `/api` prefix included.
async fn proxy(State(state): State<ProxyState>, request: Request) -> Result<Response, HostError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/api");
    let url = format!("{}{}", state.api_url, path_and_query);

    let body = to_bytes(body, MAX_PROXY_BODY)
        .await
        .map_err(|e| HostError::Body(e.to_string()))?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    debug!(method = %parts.method, %url, "proxying");
    let upstream = state
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(HostError::Upstream)?;

    let status = upstream.status();
    let mut relayed = upstream.headers().clone();
    strip_hop_by_hop(&mut relayed);
    relayed.remove(header::CONTENT_LENGTH);
    let bytes = upstream.bytes().await.map_err(HostError::Upstream)?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = relayed;
    Ok(response)
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}
