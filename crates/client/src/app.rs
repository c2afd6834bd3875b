//! Top-level coordinator: wires the client together and owns the reactions to
//! session transitions.

use std::sync::{Arc, Weak};

use trafficdesk_auth::{RouteDecision, SessionEvent, authorize_route};
use trafficdesk_events::{EventBus, EventHandler};

use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::gateway::{ApiGateway, SessionBus};
use crate::navigation::{Location, Navigator, Route};
use crate::notify::Notifier;
use crate::session::SessionManager;
use crate::store::{SessionStore, SqliteSessionStore};

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Application state shared by the views and the terminal shell.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<ClientConfig>,
    pub store: Arc<dyn SessionStore>,
    pub events: Arc<SessionBus>,
    pub gateway: ApiGateway,
    pub session: Arc<SessionManager>,
    pub notifier: Arc<Notifier>,
    pub navigator: Arc<Navigator>,
}

impl App {
    /// Build the client on the SQLite session store under the data directory.
    ///
    /// The database is opened lazily on first use.
    pub async fn start(config: ClientConfig) -> ApiResult<Self> {
        let store = Arc::new(SqliteSessionStore::new(config.session_db_path()));
        Self::with_store(config, store).await
    }

    pub async fn with_store(config: ClientConfig, store: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let events = Arc::new(SessionBus::new());
        let gateway = ApiGateway::new(&config.api_base_url, store.clone(), events.clone())?;
        let session = Arc::new(SessionManager::new(
            store.clone(),
            gateway.clone(),
            events.clone(),
        ));
        let notifier = Arc::new(Notifier::new(config.notification_timeout));
        let navigator = Arc::new(Navigator::new());

        events.register(Arc::new(SessionCoordinator {
            session: Arc::downgrade(&session),
            navigator: navigator.clone(),
            notifier: notifier.clone(),
        }));

        let hydrated = session.hydrate().await;
        if hydrated.is_authenticated() {
            navigator.go(Route::Dashboard);
        }

        tracing::info!(api = %gateway.base_url(), "client started");

        Ok(Self {
            config: Arc::new(config),
            store,
            events,
            gateway,
            session,
            notifier,
            navigator,
        })
    }

    /// Resolve `path`, run the guard and move the navigator accordingly.
    ///
    /// A redirect to login remembers `path` as typed, not the page it resolved to.
    pub fn open(&self, path: &str) -> RouteDecision {
        let path = path.trim();
        let route = Route::resolve(path);
        if route.is_public() {
            self.navigator.go(route);
            return RouteDecision::Allow;
        }

        let decision = authorize_route(&self.session.current(), path, route.admin_only());
        match &decision {
            RouteDecision::Allow => self.navigator.go(route),
            RouteDecision::RedirectToLogin { from } => self.navigator.navigate(Location {
                route: Route::Login,
                from: Some(from.clone()),
            }),
            RouteDecision::RedirectToDashboard => self.navigator.go(Route::Dashboard),
        }
        decision
    }

    pub fn open_route(&self, route: Route) -> RouteDecision {
        self.open(route.path())
    }
}

/// Reactions to session events. Expiry comes from the gateway's 401 handling;
/// logout leaves for the login page whichever view asked for it.
struct SessionCoordinator {
    session: Weak<SessionManager>,
    navigator: Arc<Navigator>,
    notifier: Arc<Notifier>,
}

impl SessionCoordinator {
    fn expired(&self, endpoint: &str) {
        let Some(session) = self.session.upgrade() else {
            return;
        };

        let previous = session.expire();
        self.navigator.hard_reset_to_login();

        // Concurrent 401s announce once: only the first sees an authenticated session.
        if previous.is_authenticated() {
            tracing::info!(endpoint, "session expired");
            self.notifier.warning(SESSION_EXPIRED_MESSAGE);
        }
    }
}

impl EventHandler<SessionEvent> for SessionCoordinator {
    fn handle(&self, event: &SessionEvent) {
        match event {
            SessionEvent::LoggedIn { role } => {
                tracing::debug!(%role, route = %self.navigator.route(), "session started");
            }
            SessionEvent::LoggedOut => self.navigator.go(Route::Login),
            SessionEvent::Expired { endpoint } => self.expired(endpoint),
        }
    }
}
