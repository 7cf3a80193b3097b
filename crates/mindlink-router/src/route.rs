//! The route table: which paths exist and who may enter them.

/// Who may enter a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Requires a valid (or silently refreshable) session.
    Authenticated,
    /// Requires a session whose user carries the admin flag.
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path without leading or trailing slashes, e.g. `admin/users`.
    pub path: &'static str,
    pub access: Access,
}

impl Route {
    pub const fn new(path: &'static str, access: Access) -> Self {
        Self { path, access }
    }
}

/// Outcome of looking a path up in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'a> {
    Route(&'a Route),
    /// The path is an alias or unknown; go here instead.
    Redirect(String),
}

/// An ordered set of routes plus the two well-known targets every guard
/// redirects to.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    /// Public entry (sign-in). Also the fallback for unknown paths.
    pub login: &'static str,
    /// Default authenticated route; `/` redirects here.
    pub home: &'static str,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::mindlink()
    }
}

impl RouteTable {
    pub fn new(routes: Vec<Route>, login: &'static str, home: &'static str) -> Self {
        Self {
            routes,
            login,
            home,
        }
    }

    /// The MindLink UI routes.
    pub fn mindlink() -> Self {
        use Access::*;
        Self {
            routes: vec![
                Route::new("auth", Public),
                Route::new("graph", Authenticated),
                Route::new("graph3d", Authenticated),
                Route::new("dashboard", Authenticated),
                Route::new("ideas", Authenticated),
                Route::new("explore", Authenticated),
                Route::new("settings", Authenticated),
                Route::new("admin/training", Admin),
                Route::new("admin/users", Admin),
            ],
            login: "/auth",
            home: "/graph",
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Looks `path` up. The empty path redirects to `home`, anything not
    /// in the table redirects to `login`.
    pub fn resolve(&self, path: &str) -> Resolved<'_> {
        let path = normalize(path);
        if path.is_empty() {
            return Resolved::Redirect(self.home.to_string());
        }
        match self.routes.iter().find(|r| r.path == path) {
            Some(route) => Resolved::Route(route),
            None => Resolved::Redirect(self.login.to_string()),
        }
    }
}

/// Strips query, fragment and surrounding slashes: `/ideas/?x=1` → `ideas`.
pub fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/ideas/"), "ideas");
        assert_eq!(normalize("admin/users?page=2"), "admin/users");
        assert_eq!(normalize("/graph#node-4"), "graph");
        assert_eq!(normalize("/"), "");
    }

    #[test]
    fn test_resolve_known_routes() {
        let table = RouteTable::mindlink();

        match table.resolve("/admin/training") {
            Resolved::Route(route) => assert_eq!(route.access, Access::Admin),
            other => panic!("expected route, got {other:?}"),
        }
        match table.resolve("/auth") {
            Resolved::Route(route) => assert_eq!(route.access, Access::Public),
            other => panic!("expected route, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_root_goes_home() {
        let table = RouteTable::mindlink();
        assert_eq!(table.resolve("/"), Resolved::Redirect("/graph".into()));
        assert_eq!(table.resolve(""), Resolved::Redirect("/graph".into()));
    }

    #[test]
    fn test_resolve_unknown_goes_to_login() {
        let table = RouteTable::mindlink();
        assert_eq!(table.resolve("/nope"), Resolved::Redirect("/auth".into()));
    }
}
