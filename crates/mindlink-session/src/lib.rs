//! Session lifecycle for the MindLink client.
//!
//! This crate owns everything about "who is signed in":
//!
//! 1. **Token storage**: access/refresh tokens persisted in a
//!    [`KeyValueStore`] ([`MemoryStore`], [`FileStore`]) via [`TokenStore`].
//! 2. **Session transitions**: login, register, logout and silent refresh
//!    through [`SessionManager`], observable as a [`SessionContext`].
//! 3. **Single-flight refresh**: concurrent refresh requests share one
//!    call to the API ([`SingleFlight`]).
//! 4. **Keep-alive**: a background task that refreshes on a fixed
//!    cadence while signed in ([`KeepAlive`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Client / Router (above)  ← read the session through `Authenticator`
//!     ↕
//! Session Layer (this crate)  ← owns tokens and state transitions
//!     ↕
//! Protocol + Transport (below)  ← token claims, auth bodies, HTTP
//! ```

mod auth;
mod error;
mod keepalive;
mod manager;
mod session;
mod single_flight;
mod store;

pub use auth::Authenticator;
pub use error::{SessionError, StoreError};
pub use keepalive::KeepAlive;
pub use manager::SessionManager;
pub use session::{AuthEndpoints, SessionConfig, SessionContext, SessionSnapshot, SessionState};
pub use single_flight::SingleFlight;
pub use store::{
    ACCESS_TOKEN_KEY, FileStore, KeyValueStore, MemoryStore, REFRESH_TOKEN_KEY, TokenStore,
};
