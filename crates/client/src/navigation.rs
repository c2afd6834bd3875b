//! Route table and the navigator holding the current location.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Dashboard,
    Users,
    RegisterUser,
    Rules,
    Records,
    AddRecord,
    SearchRecord,
    Profile,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Login,
        Route::Dashboard,
        Route::Users,
        Route::RegisterUser,
        Route::Rules,
        Route::Records,
        Route::AddRecord,
        Route::SearchRecord,
        Route::Profile,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Users => "/users",
            Self::RegisterUser => "/users/register",
            Self::Rules => "/rules",
            Self::Records => "/records",
            Self::AddRecord => "/records/add",
            Self::SearchRecord => "/records/search",
            Self::Profile => "/profile",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Dashboard => "Dashboard",
            Self::Users => "Users",
            Self::RegisterUser => "Register Personnel",
            Self::Rules => "Traffic Rules",
            Self::Records => "Violation Records",
            Self::AddRecord => "Add Record",
            Self::SearchRecord => "Search Record",
            Self::Profile => "Profile",
        }
    }

    pub fn admin_only(self) -> bool {
        matches!(self, Self::RegisterUser)
    }

    pub fn is_public(self) -> bool {
        matches!(self, Self::Login)
    }

    /// Map a path to a route. `/` is the login page; anything unknown falls
    /// back to the dashboard.
    pub fn resolve(path: &str) -> Route {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Self::Login;
        }

        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self::ALL
            .into_iter()
            .find(|route| route.path() == normalized)
            .unwrap_or(Self::Dashboard)
    }
}

impl core::fmt::Display for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub route: Route,
    /// Where the user was headed before being sent to login.
    pub from: Option<String>,
}

impl Location {
    pub fn new(route: Route) -> Self {
        Self { route, from: None }
    }
}

/// Proof that a view was mounted at a given point in navigation history.
///
/// A token stops being current as soon as the navigator moves, which is how
/// responses arriving after the user left a view are recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewToken {
    generation: u64,
    route: Route,
}

impl ViewToken {
    pub fn route(&self) -> Route {
        self.route
    }
}

#[derive(Debug)]
struct NavState {
    location: Location,
    generation: u64,
}

#[derive(Debug)]
pub struct Navigator {
    state: Mutex<NavState>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NavState {
                location: Location::new(Route::Login),
                generation: 0,
            }),
        }
    }

    pub fn current(&self) -> Location {
        self.lock().location.clone()
    }

    pub fn route(&self) -> Route {
        self.lock().location.route
    }

    /// Move to a new location. Every mounted view becomes stale.
    pub fn navigate(&self, location: Location) {
        let mut state = self.lock();
        tracing::debug!(from = %state.location.route, to = %location.route, "navigate");
        state.location = location;
        state.generation += 1;
    }

    pub fn go(&self, route: Route) {
        self.navigate(Location::new(route));
    }

    /// Forced jump to login after the server rejected the session. Already
    /// being on the login page is left undisturbed.
    pub fn hard_reset_to_login(&self) {
        let mut state = self.lock();
        if state.location.route == Route::Login {
            return;
        }
        tracing::info!(from = %state.location.route, "forced navigation to login");
        state.location = Location::new(Route::Login);
        state.generation += 1;
    }

    /// Token for the view rendering the current location.
    pub fn mount(&self) -> ViewToken {
        let state = self.lock();
        ViewToken {
            generation: state.generation,
            route: state.location.route,
        }
    }

    pub fn is_current(&self, token: &ViewToken) -> bool {
        self.lock().generation == token.generation
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
