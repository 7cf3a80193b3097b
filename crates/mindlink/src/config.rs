//! Host configuration from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::HostError;

/// Backend origin. `DJANGO_API_URL` is accepted as a fallback name.
pub const API_URL_VAR: &str = "MINDLINK_API_URL";
const LEGACY_API_URL_VAR: &str = "DJANGO_API_URL";
pub const PORT_VAR: &str = "PORT";
pub const DIST_DIR_VAR: &str = "MINDLINK_DIST_DIR";

/// Settings for the `mindlink-host` process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Origin `/api/*` requests are forwarded to, without trailing slash.
    pub api_url: String,
    pub bind_ip: IpAddr,
    pub port: u16,
    /// Built front-end assets.
    pub dist_dir: PathBuf,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4000,
            dist_dir: PathBuf::from("dist/mindlink-ui/browser"),
        }
    }
}

impl HostConfig {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, HostError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Unset or empty
    /// variables keep their defaults.
    ///
    /// # Errors
    /// [`HostError::InvalidPort`] or [`HostError::InvalidApiUrl`] when a
    /// set value can't be used.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HostError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(API_URL_VAR).or_else(|| get(LEGACY_API_URL_VAR)) {
            let parsed = reqwest::Url::parse(url.trim())
                .map_err(|_| HostError::InvalidApiUrl(url.clone()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(HostError::InvalidApiUrl(url));
            }
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(port) = get(PORT_VAR) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| HostError::InvalidPort(port.clone()))?;
        }
        if let Some(dir) = get(DIST_DIR_VAR) {
            config.dist_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }
}
