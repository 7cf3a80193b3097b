//! Typed wrappers over the MindLink resource APIs.
//!
//! Each service is a thin, cloneable handle around an [`ApiClient`]; paths
//! are relative to the API root the transport was configured with.
//!
//! [`ApiClient`]: crate::ApiClient

mod account;
mod admin;
mod connections;
mod ideas;
mod similarity;

pub use account::{
    ACCENT_KEY, AccentColor, NotificationsService, SettingsService, THEME_KEY, Theme,
    ThemePreference, ThemeStore,
};
pub use admin::{AdminService, TrainingService};
pub use connections::ConnectionsService;
pub use ideas::IdeasService;
pub use similarity::SimilarityService;

/// An empty JSON object, for POSTs that take no parameters.
fn empty_body() -> serde_json::Value {
    serde_json::json!({})
}
