//! Route table and auth gate.
//!
//! The view layer owns navigation; this module only decides whether a target
//! route is reachable given the current session. The decision is a pure
//! function of in-memory state — no network access, no suspension.

/// The application's routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Login,
    Signup,
    Dashboard,
    Subscription,
}

impl Route {
    /// Whether the route is behind the auth gate.
    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Dashboard | Route::Subscription)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Dashboard => "/dashboard",
            Route::Subscription => "/subscription",
        }
    }
}

/// Auth-gate decision for a navigation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Route),
}

/// Gate `to` against the presence of a session.
pub fn guard(signed_in: bool, to: Route) -> Access {
    if to.requires_auth() && !signed_in {
        Access::Redirect(Route::Login)
    } else {
        Access::Allow
    }
}
