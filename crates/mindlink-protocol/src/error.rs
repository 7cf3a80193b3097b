//! Error types for the protocol layer.
//!
//! Each crate in MindLink defines its own error enum. A `ProtocolError`
//! always means the bytes were there but could not be turned into (or out
//! of) the expected shape; networking and session problems live elsewhere.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: an HTML error page where JSON was expected,
    /// missing required fields, or truncated bodies.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A bearer token is not in `header.payload.signature` form, or its
    /// payload is not base64url-encoded JSON carrying an `exp` claim.
    #[error("malformed token: {0}")]
    MalformedToken(String),
}
