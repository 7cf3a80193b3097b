//! Serves the MindLink UI and proxies `/api/*` to the backend.
//!
//! Configured by `MINDLINK_API_URL` (or `DJANGO_API_URL`), `PORT`,
//! `MINDLINK_DIST_DIR` and `RUST_LOG`; a `.env` file is honoured.

use std::process::ExitCode;

use mindlink::{HostConfig, host};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = match HostConfig::from_env() {
        Ok(config) => host::serve(config).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "mindlink host failed");
            ExitCode::FAILURE
        }
    }
}
