//! Route table and navigation guards for MindLink.
//!
//! - [`RouteTable`]: the UI's routes and their [`Access`] level
//! - [`AuthGuard`] / [`AdminGuard`]: the [`Guard`]s protecting them
//! - [`Navigator`]: resolves a path and runs its guards to a final
//!   [`Navigation`]
//!
//! Guards read the session through
//! [`Authenticator`](mindlink_session::Authenticator) and share its
//! single-flight refresh with the request pipeline.

#![allow(async_fn_in_trait)]

mod error;
mod guard;
mod navigator;
mod route;

pub use error::RouterError;
pub use guard::{AdminGuard, AuthGuard, Guard, GuardOutcome};
pub use navigator::{Navigation, Navigator};
pub use route::{Access, Resolved, Route, RouteTable, normalize};
