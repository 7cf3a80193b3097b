//! Wire types for the MindLink REST API.
//!
//! Every type here is a body that crosses the HTTP boundary, either sent
//! to the API or received from it. Field names follow the API's snake_case
//! JSON, so no renaming is needed beyond the odd alias.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Newtype IDs keep a `UserId` from being passed where an `IdeaId` is
/// expected, even though both are plain integers on the wire.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

id_type!(
    /// A user account on the API.
    UserId, "U"
);
id_type!(
    /// A single idea in the knowledge graph.
    IdeaId, "I"
);
id_type!(
    /// A directed, weighted edge between two ideas.
    ConnectionId, "C"
);
id_type!(
    /// An entry in the user's notification feed.
    NotificationId, "N"
);

// ---------------------------------------------------------------------------
// Auth API bodies
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login/` and `POST /auth/register/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Never print the password, not even in debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login/register response: an access + refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of `POST /auth/refresh/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Successful refresh response. `refresh` is present only when the issuer
/// rotates refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// The JSON error body the API returns on 4xx/5xx, all fields optional.
///
/// Different endpoints use different keys (`error`, `message`, `detail`),
/// so [`ErrorBody::message`] picks whichever is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Best-effort human-readable message: `error`, then `message`, then
    /// `detail`.
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .or(self.detail.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Ideas
// ---------------------------------------------------------------------------

/// An idea as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: IdeaId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Owner's username.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub outgoing_connections: Vec<Connection>,
}

/// Body of `POST /ideas/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdea {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Body of `PATCH /ideas/{id}/`; only the set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Per-signal weights for the related-ideas ranking. Unset weights fall
/// back to the server's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedWeights {
    pub cosine: Option<f64>,
    pub keywords: Option<f64>,
    pub category: Option<f64>,
}

impl RelatedWeights {
    /// The set weights as query parameters, in a stable order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        [
            ("cosine", self.cosine),
            ("keywords", self.keywords),
            ("category", self.category),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.to_string())))
        .collect()
    }
}

/// Aggregate statistics over the user's ideas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightData {
    pub total_ideas: u64,
    #[serde(default)]
    pub categories: Vec<CategoryCount>,
    #[serde(default)]
    pub top_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Body of `POST /analyze/`: analyse a stored idea or a free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IdeaId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

/// A connection between two ideas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub id: Option<ConnectionId>,
    pub source: IdeaId,
    pub target: IdeaId,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub strength: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_title: Option<String>,
    #[serde(default)]
    pub target_title: Option<String>,
}

/// Body of `POST /connections/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConnection {
    pub source: IdeaId,
    pub target: IdeaId,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

/// Body of `PATCH /connections/{id}/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

// ---------------------------------------------------------------------------
// Similarity search
// ---------------------------------------------------------------------------

/// Body of `POST /similar/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityQuery {
    pub text: String,
    pub top_k: u32,
    pub min_threshold: f64,
}

impl SimilarityQuery {
    pub const DEFAULT_TOP_K: u32 = 5;
    pub const DEFAULT_MIN_THRESHOLD: f64 = 0.5;

    /// A query with the API's customary defaults (top 5, score ≥ 0.5).
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            top_k: Self::DEFAULT_TOP_K,
            min_threshold: Self::DEFAULT_MIN_THRESHOLD,
        }
    }
}

/// One ranked match from the similarity endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarIdea {
    pub id: IdeaId,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "score")]
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResults {
    pub results: Vec<SimilarIdea>,
}

// ---------------------------------------------------------------------------
// Graph map
// ---------------------------------------------------------------------------

/// The knowledge graph as consumed by the graph views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMap {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default, alias = "edges")]
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: IdeaId,
    #[serde(default, alias = "title")]
    pub label: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: IdeaId,
    pub target: IdeaId,
    #[serde(default, alias = "strength")]
    pub weight: Option<f64>,
}

// ---------------------------------------------------------------------------
// Training, notifications, settings, admin
// ---------------------------------------------------------------------------

/// Response of `POST /training/start/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Server-side user preferences. `preferences` is free-form JSON that the
/// API deep-merges on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub preferences: serde_json::Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user as listed by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub idea_count: u64,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

/// Result of `PATCH /admin/users/{id}/toggle/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToggle {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub is_active: bool,
}
