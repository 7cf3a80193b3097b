/// Errors that can occur in the transport layer.
///
/// A transport error means no HTTP response was obtained at all. Any
/// response, whatever its status, is returned as `Ok(ApiResponse)`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The remote host could not be reached (DNS, connect, TLS, timeout).
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The request could not be built (bad URL, invalid header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reading the response body failed after the status was received.
    #[error("failed to read response body: {0}")]
    Body(String),
}
