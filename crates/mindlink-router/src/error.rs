//! Error types for the routing layer.

/// Errors that can occur while navigating.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Guards kept redirecting without ever landing on an allowed route.
    #[error("redirect loop navigating to {requested}: {chain:?}")]
    RedirectLoop {
        requested: String,
        chain: Vec<String>,
    },
}
