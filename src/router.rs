//! Client-side routes and the guard that protects them
//!
//! The guard is a pure function of the session's `authenticated` and
//! `loading` flags; it keeps no state of its own.

use std::fmt;

use taskboard_rust_auth::Session;

/// Every screen of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Projects,
    ProjectNew,
    ProjectDetail(i64),
    ProjectEdit(i64),
    Tasks,
    TaskNew,
    TaskDetail(i64),
    TaskEdit(i64),
    /// Anything unrecognised; always redirects to the login route
    NotFound,
}

/// Who may see a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Only visitors without a session (login, registration)
    GuestOnly,
    /// Only authenticated users
    Protected,
    /// Never rendered
    Redirect,
}

/// Outcome of guarding a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the route's content
    Render,
    /// Session is still being established; show a placeholder and decide later
    Placeholder,
    /// Go somewhere else instead
    Redirect(Route),
}

impl Route {
    /// Resolve a path such as `/tasks/12` or `/projects/edit/3`
    pub fn parse(path: &str) -> Route {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Login,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["projects"] => Route::Projects,
            ["projects", "new"] => Route::ProjectNew,
            ["projects", "edit", id] => parse_id(id).map_or(Route::NotFound, Route::ProjectEdit),
            ["projects", id] => parse_id(id).map_or(Route::NotFound, Route::ProjectDetail),
            ["tasks"] => Route::Tasks,
            ["tasks", "new"] => Route::TaskNew,
            ["tasks", "edit", id] => parse_id(id).map_or(Route::NotFound, Route::TaskEdit),
            ["tasks", id] => parse_id(id).map_or(Route::NotFound, Route::TaskDetail),
            _ => Route::NotFound,
        }
    }

    /// Canonical path; `NotFound` has none and maps to `/`
    pub fn path(&self) -> String {
        match self {
            Route::Login | Route::NotFound => "/".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::ProjectNew => "/projects/new".to_string(),
            Route::ProjectDetail(id) => format!("/projects/{}", id),
            Route::ProjectEdit(id) => format!("/projects/edit/{}", id),
            Route::Tasks => "/tasks".to_string(),
            Route::TaskNew => "/tasks/new".to_string(),
            Route::TaskDetail(id) => format!("/tasks/{}", id),
            Route::TaskEdit(id) => format!("/tasks/edit/{}", id),
        }
    }

    pub fn access(&self) -> RouteAccess {
        match self {
            Route::Login | Route::Register => RouteAccess::GuestOnly,
            Route::NotFound => RouteAccess::Redirect,
            _ => RouteAccess::Protected,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn parse_id(segment: &str) -> Option<i64> {
    segment.parse().ok()
}

/// Decide what a route shows given the session flags
pub fn guard(access: RouteAccess, authenticated: bool, loading: bool) -> GuardDecision {
    match access {
        RouteAccess::Protected if loading => GuardDecision::Placeholder,
        RouteAccess::Protected if !authenticated => GuardDecision::Redirect(Route::Login),
        RouteAccess::Protected => GuardDecision::Render,
        RouteAccess::GuestOnly if authenticated => GuardDecision::Redirect(Route::Dashboard),
        RouteAccess::GuestOnly => GuardDecision::Render,
        RouteAccess::Redirect => GuardDecision::Redirect(Route::Login),
    }
}

/// Result of a navigation after following redirects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// The route finally landed on
    pub route: Route,
    /// What to show there
    pub decision: GuardDecision,
}

/// Resolves paths to routes and evaluates the guard on every navigation
#[derive(Debug, Default, Clone, Copy)]
pub struct Router;

impl Router {
    const MAX_REDIRECTS: usize = 4;

    /// Guard one route against a session snapshot
    pub fn check(route: Route, session: &Session) -> GuardDecision {
        guard(route.access(), session.authenticated, session.loading)
    }

    /// Navigate to `path`, following redirects until a route renders or
    /// waits on the session
    pub fn navigate(path: &str, session: &Session) -> Navigation {
        Self::navigate_to(Route::parse(path), session)
    }

    pub fn navigate_to(mut route: Route, session: &Session) -> Navigation {
        for _ in 0..Self::MAX_REDIRECTS {
            match Self::check(route, session) {
                GuardDecision::Redirect(next) => {
                    log::debug!("Redirecting {} -> {}", route, next);
                    route = next;
                }
                decision => return Navigation { route, decision },
            }
        }

        Navigation {
            route,
            decision: Self::check(route, session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(authenticated: bool, loading: bool) -> Session {
        Session {
            authenticated,
            loading,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse(""), Route::Login);
        assert_eq!(Route::parse("/register"), Route::Register);
        assert_eq!(Route::parse("/dashboard"), Route::Dashboard);
        assert_eq!(Route::parse("/projects/"), Route::Projects);
        assert_eq!(Route::parse("/projects/new"), Route::ProjectNew);
        assert_eq!(Route::parse("/projects/7"), Route::ProjectDetail(7));
        assert_eq!(Route::parse("/projects/edit/7"), Route::ProjectEdit(7));
        assert_eq!(Route::parse("/tasks?status=DONE"), Route::Tasks);
        assert_eq!(Route::parse("/tasks/new"), Route::TaskNew);
        assert_eq!(Route::parse("/tasks/12"), Route::TaskDetail(12));
        assert_eq!(Route::parse("/tasks/edit/12"), Route::TaskEdit(12));
        assert_eq!(Route::parse("/tasks/abc"), Route::NotFound);
        assert_eq!(Route::parse("/settings"), Route::NotFound);
    }

    #[test]
    fn test_path_roundtrip() {
        for route in [
            Route::Register,
            Route::Dashboard,
            Route::ProjectEdit(3),
            Route::TaskDetail(9),
            Route::TaskNew,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_protected_route_decisions() {
        let access = RouteAccess::Protected;
        assert_eq!(guard(access, false, true), GuardDecision::Placeholder);
        assert_eq!(guard(access, true, true), GuardDecision::Placeholder);
        assert_eq!(guard(access, false, false), GuardDecision::Redirect(Route::Login));
        assert_eq!(guard(access, true, false), GuardDecision::Render);
    }

    #[test]
    fn test_guest_only_route_decisions() {
        let access = RouteAccess::GuestOnly;
        assert_eq!(guard(access, false, false), GuardDecision::Render);
        assert_eq!(guard(access, false, true), GuardDecision::Render);
        assert_eq!(
            guard(access, true, false),
            GuardDecision::Redirect(Route::Dashboard)
        );
    }

    #[test]
    fn test_navigate_follows_redirects() {
        let signed_in = session(true, false);
        let signed_out = session(false, false);

        let nav = Router::navigate("/", &signed_in);
        assert_eq!(nav.route, Route::Dashboard);
        assert_eq!(nav.decision, GuardDecision::Render);

        let nav = Router::navigate("/nowhere", &signed_in);
        assert_eq!(nav.route, Route::Dashboard);

        let nav = Router::navigate("/tasks/4", &signed_out);
        assert_eq!(nav.route, Route::Login);
        assert_eq!(nav.decision, GuardDecision::Render);

        let nav = Router::navigate("/tasks/4", &session(false, true));
        assert_eq!(nav.route, Route::TaskDetail(4));
        assert_eq!(nav.decision, GuardDecision::Placeholder);
    }
}
