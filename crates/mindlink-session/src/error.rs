//! Error types for the session layer.

/// Errors surfaced by session operations (login, register).
///
/// Refresh never returns these: a failed refresh collapses to a logged-out
/// session and a `false` result, so callers don't need error handling for
/// expected auth failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The auth API answered with a non-2xx status. `message` is the best
    /// effort extraction from the response body.
    #[error("authentication rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The auth API could not be reached at all.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The auth API answered 2xx but the body or the tokens inside it
    /// could not be read. Nothing is persisted in that case.
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),

    /// The token store could not persist the new tokens.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from a [`KeyValueStore`](crate::KeyValueStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but isn't a JSON object of strings.
    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
