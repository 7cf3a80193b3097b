//! Authenticated access to the MindLink API.
//!
//! - **Pipeline** ([`Pipeline`], [`Middleware`]): the ordered middleware
//!   chain every request passes through: tracing, refresh-and-retry on
//!   401, bearer token attachment.
//! - **Client** ([`ApiClient`]): typed verbs over the pipeline, with
//!   failures normalised into [`ApiError`].
//! - **Services** ([`services`]): one handle per resource API.
//!
//! ```text
//! services → ApiClient → Pipeline → HttpTransport
//!                           ↕
//!                     Authenticator (session)
//! ```

mod client;
mod error;
mod middleware;
mod pipeline;
pub mod services;

pub use client::ApiClient;
pub use error::ApiError;
pub use middleware::{BearerAuth, RefreshOnUnauthorized, RequestTrace};
pub use pipeline::{Endpoint, Middleware, Next, Pipeline, PipelineResult, RequestContext};
