//! Path → route → guards → final destination.

use std::sync::Arc;

use mindlink_session::Authenticator;
use tracing::{debug, info};

use crate::{Access, AdminGuard, AuthGuard, Guard, GuardOutcome, Resolved, RouteTable, RouterError};

/// Redirects followed before a navigation is declared a loop.
const MAX_REDIRECTS: usize = 8;

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The path originally asked for.
    pub requested: String,
    /// The route finally entered, e.g. `/graph`.
    pub path: String,
    /// Every redirect taken on the way, in order.
    pub redirects: Vec<String>,
}

impl Navigation {
    pub fn is_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Resolves paths against a [`RouteTable`] and runs the guards each route
/// requires.
pub struct Navigator {
    table: RouteTable,
    auth: AuthGuard,
    admin: AdminGuard,
}

impl Navigator {
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        Self::with_table(auth, RouteTable::mindlink())
    }

    pub fn with_table(auth: Arc<dyn Authenticator>, table: RouteTable) -> Self {
        let auth_guard = AuthGuard::new(auth, table.login);
        let admin_guard = AdminGuard::new(auth_guard.clone(), "/");
        Self {
            table,
            auth: auth_guard,
            admin: admin_guard,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Navigates to `path`, following alias and guard redirects until a
    /// route admits the session.
    ///
    /// # Errors
    /// [`RouterError::RedirectLoop`] if the redirects never settle.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, RouterError> {
        let mut target = path.to_string();
        let mut redirects = Vec::new();

        while redirects.len() <= MAX_REDIRECTS {
            let outcome = match self.table.resolve(&target) {
                Resolved::Redirect(to) => GuardOutcome::Redirect(to),
                Resolved::Route(route) => match route.access {
                    Access::Public => GuardOutcome::Allow,
                    Access::Authenticated => self.auth.check(&target).await,
                    Access::Admin => self.admin.check(&target).await,
                },
            };

            match outcome {
                GuardOutcome::Allow => {
                    info!(requested = path, landed = %target, "navigated");
                    return Ok(Navigation {
                        requested: path.to_string(),
                        path: target,
                        redirects,
                    });
                }
                GuardOutcome::Redirect(to) => {
                    debug!(from = %target, to = %to, "redirect");
                    redirects.push(to.clone());
                    target = to;
                }
            }
        }

        Err(RouterError::RedirectLoop {
            requested: path.to_string(),
            chain: redirects,
        })
    }
}
