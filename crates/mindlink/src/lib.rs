//! # MindLink
//!
//! Client core for the MindLink idea-graph service: who is signed in, how
//! requests reach the API, and which screens a user may open.
//!
//! [`Mindlink`] wires the layers together over one token store:
//!
//! ```text
//! Router (navigation guards)      Services (ideas, connections, ...)
//!        ↘                          ↙
//!          Session  ←  ApiClient pipeline (bearer, refresh-and-retry)
//!               ↘          ↙
//!            Protocol + Transport
//! ```
//!
//! The [`host`] module and the `mindlink-host` binary serve the built UI
//! and proxy `/api/*` to the backend.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mindlink::prelude::*;
//!
//! # async fn run() -> Result<(), MindlinkError> {
//! let app = Mindlink::new("http://localhost:8000/api", FileStore::open("session.json")?)?;
//! let _keepalive = app.spawn_keepalive();
//!
//! app.session().login("alice", "s3cret").await?;
//! let ideas = app.ideas().list().await?;
//! let nav = app.navigator().navigate("/admin").await?;
//! println!("{} ideas, landed on {}", ideas.len(), nav.path);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod host;

use std::sync::Arc;

pub use config::{API_URL_VAR, DIST_DIR_VAR, HostConfig, PORT_VAR};
pub use error::{HostError, MindlinkError};

pub use mindlink_client as client;
pub use mindlink_protocol as protocol;
pub use mindlink_router as router;
pub use mindlink_session as session;
pub use mindlink_tick as tick;
pub use mindlink_transport as transport;

use mindlink_client::ApiClient;
use mindlink_client::services::{
    AdminService, ConnectionsService, IdeasService, NotificationsService, SettingsService,
    SimilarityService, ThemeStore, TrainingService,
};
use mindlink_router::{Navigator, RouteTable};
use mindlink_session::{Authenticator, KeepAlive, KeyValueStore, SessionConfig, SessionManager};
use mindlink_transport::{HttpTransport, ReqwestTransport};

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::{HostConfig, HostError, Mindlink, MindlinkError};
    pub use mindlink_client::services::{
        AdminService, ConnectionsService, IdeasService, NotificationsService, SettingsService,
        SimilarityService, Theme, ThemePreference, ThemeStore, TrainingService,
    };
    pub use mindlink_client::{ApiClient, ApiError};
    pub use mindlink_protocol::{CurrentUser, Idea, IdeaId, NewIdea};
    pub use mindlink_router::{Access, GuardOutcome, Navigation, Navigator, RouteTable};
    pub use mindlink_session::{
        Authenticator, FileStore, KeepAlive, KeyValueStore, MemoryStore, SessionContext,
        SessionManager, SessionState,
    };
    pub use mindlink_transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
}

/// One signed-in client: a session, the API pipeline bound to it, the
/// guarded navigator and the theme preference, all sharing one store.
pub struct Mindlink<S: KeyValueStore, T: HttpTransport = ReqwestTransport> {
    session: Arc<SessionManager<Arc<T>, Arc<S>>>,
    client: ApiClient,
    navigator: Navigator,
    theme: ThemeStore<Arc<S>>,
}

impl<S: KeyValueStore> Mindlink<S> {
    /// Talks to the API at `api_url` over HTTP.
    ///
    /// # Errors
    /// [`MindlinkError::Transport`] if `api_url` is not a usable base URL.
    pub fn new(api_url: &str, store: S) -> Result<Self, MindlinkError> {
        Ok(Self::with_transport(ReqwestTransport::new(api_url)?, store))
    }
}

impl<S: KeyValueStore, T: HttpTransport> Mindlink<S, T> {
    pub fn with_transport(transport: T, store: S) -> Self {
        Self::with_config(transport, store, SessionConfig::default(), RouteTable::mindlink())
    }

    pub fn with_config(transport: T, store: S, config: SessionConfig, routes: RouteTable) -> Self {
        let transport = Arc::new(transport);
        let store = Arc::new(store);
        let endpoints = config.endpoints.clone();

        let session = Arc::new(SessionManager::with_config(
            Arc::clone(&transport),
            Arc::clone(&store),
            config,
        ));
        let auth: Arc<dyn Authenticator> = session.clone();
        let client = ApiClient::with_endpoints(transport, Arc::clone(&auth), endpoints);

        Self {
            session,
            client,
            navigator: Navigator::with_table(auth, routes),
            theme: ThemeStore::new(store),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager<Arc<T>, Arc<S>>> {
        &self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn theme(&self) -> &ThemeStore<Arc<S>> {
        &self.theme
    }

    /// Starts the background keep-alive. Refreshing stops when the handle
    /// is dropped.
    pub fn spawn_keepalive(&self) -> KeepAlive {
        self.session.spawn_keepalive()
    }

    // -----------------------------------------------------------------------
    // Feature services
    // -----------------------------------------------------------------------

    pub fn ideas(&self) -> IdeasService {
        IdeasService::new(self.client.clone())
    }

    pub fn connections(&self) -> ConnectionsService {
        ConnectionsService::new(self.client.clone())
    }

    pub fn similarity(&self) -> SimilarityService {
        SimilarityService::new(self.client.clone())
    }

    pub fn notifications(&self) -> NotificationsService {
        NotificationsService::new(self.client.clone())
    }

    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.client.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.client.clone())
    }

    pub fn training(&self) -> TrainingService {
        TrainingService::new(self.client.clone())
    }
}
