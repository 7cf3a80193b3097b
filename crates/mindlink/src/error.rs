//! Unified error type for MindLink, plus the host's own errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mindlink_client::ApiError;
use mindlink_protocol::ProtocolError;
use mindlink_router::RouterError;
use mindlink_session::{SessionError, StoreError};
use mindlink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` conversions let `?` lift any layer's error into this one.
#[derive(Debug, thiserror::Error)]
pub enum MindlinkError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Errors from configuring or running the UI host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("invalid PORT {0:?}")]
    InvalidPort(String),

    #[error("invalid backend URL {0:?}")]
    InvalidApiUrl(String),

    /// The backend origin could not be reached (or timed out).
    #[error("backend unreachable: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("could not read request body: {0}")]
    Body(String),

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for HostError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self, status = status.as_u16(), "proxy request failed");
        (status, status.canonical_reason().unwrap_or("error")).into_response()
    }
}
