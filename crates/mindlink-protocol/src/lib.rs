//! Wire protocol for the MindLink API.
//!
//! This crate defines the "language" that the client and the API speak:
//!
//! - **Types** ([`Idea`], [`Connection`], [`TokenPair`], etc.): the JSON
//!   bodies that cross the HTTP boundary.
//! - **Tokens** ([`TokenClaims`], [`CurrentUser`]): what the client reads
//!   out of a bearer token's payload.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies are converted
//!   to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! It knows nothing about sending requests or about sessions:
//!
//! ```text
//! Transport (bytes) → Protocol (typed bodies) → Session / Client
//! ```

mod codec;
mod error;
mod token;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use token::{CurrentUser, TokenClaims};
pub use types::{
    AdminUser, AnalyzeRequest, CategoryCount, Connection, ConnectionId,
    ConnectionPatch, Credentials, ErrorBody, GraphLink, GraphMap, GraphNode,
    Idea, IdeaId, IdeaPatch, InsightData, NewConnection, NewIdea,
    Notification, NotificationId, RefreshRequest, RefreshResponse,
    RelatedWeights, SimilarIdea, SimilarityQuery, SimilarityResults,
    TokenPair, TrainingStatus, UserId, UserSettings, UserToggle,
};
