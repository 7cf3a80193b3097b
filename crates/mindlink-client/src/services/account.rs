//! Per-user state: notifications, server-side settings and the locally
//! persisted theme preference.

use std::fmt;
use std::str::FromStr;

use mindlink_protocol::{Notification, NotificationId, UserSettings};
use mindlink_session::{KeyValueStore, StoreError};
use serde_json::{Value, json};

use crate::{ApiClient, ApiError};

#[derive(Clone)]
pub struct NotificationsService {
    client: ApiClient,
}

impl NotificationsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The user's notifications, newest first.
    pub async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        self.client.get("/notifications/").await
    }

    pub async fn mark_read(&self, id: NotificationId) -> Result<(), ApiError> {
        let _: Value = self
            .client
            .post(&format!("/notifications/{}/read/", id.0), &super::empty_body())
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SettingsService {
    client: ApiClient,
}

impl SettingsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<UserSettings, ApiError> {
        self.client.get("/settings/").await
    }

    /// Sends a partial preferences object. The server deep-merges it into
    /// the stored preferences and returns the result.
    pub async fn update(&self, preferences: Value) -> Result<UserSettings, ApiError> {
        self.client
            .put("/settings/", &json!({ "preferences": preferences }))
            .await
    }
}

// ---------------------------------------------------------------------------
// Theme preference
// ---------------------------------------------------------------------------

/// Key holding the colour scheme.
pub const THEME_KEY: &str = "user_theme";
/// Key holding the accent colour.
pub const ACCENT_KEY: &str = "accent_color";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme {other:?}")),
        }
    }
}

/// A CSS colour string, e.g. `#60a5fa`. Stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccentColor(pub String);

impl Default for AccentColor {
    fn default() -> Self {
        Self("#60a5fa".into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemePreference {
    pub theme: Theme,
    pub accent: AccentColor,
}

/// Reads and writes the theme preference under its own keys, next to
/// (but independent from) the session tokens.
pub struct ThemeStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ThemeStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The saved preference. Missing or unrecognised values fall back to
    /// the defaults (dark, `#60a5fa`).
    pub fn load(&self) -> ThemePreference {
        let theme = self
            .store
            .get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let accent = self
            .store
            .get(ACCENT_KEY)
            .filter(|raw| !raw.trim().is_empty())
            .map(AccentColor)
            .unwrap_or_default();
        ThemePreference { theme, accent }
    }

    pub fn save(&self, preference: &ThemePreference) -> Result<(), StoreError> {
        self.store.set(THEME_KEY, preference.theme.as_str())?;
        self.store.set(ACCENT_KEY, &preference.accent.0)?;
        tracing::debug!(theme = %preference.theme, accent = %preference.accent.0, "theme saved");
        Ok(())
    }
}
