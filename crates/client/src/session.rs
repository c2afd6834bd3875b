//! Session state machine: the only owner of the in-memory [`Session`].

use std::sync::{Arc, PoisonError, RwLock};

use trafficdesk_auth::{Credentials, Role, Session, SessionEvent, SessionTransition};
use trafficdesk_events::EventBus;

use crate::error::ApiResult;
use crate::gateway::{ApiGateway, SessionBus};
use crate::store::SessionStore;

/// Login/logout/current capability handed to whoever needs the session.
#[derive(Debug)]
pub struct SessionManager {
    state: RwLock<Session>,
    store: Arc<dyn SessionStore>,
    gateway: ApiGateway,
    events: Arc<SessionBus>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, gateway: ApiGateway, events: Arc<SessionBus>) -> Self {
        Self {
            state: RwLock::new(Session::Anonymous),
            store,
            gateway,
            events,
        }
    }

    /// Adopt the role remembered by the store, without asking the server.
    ///
    /// An unreadable store starts the session anonymous.
    pub async fn hydrate(&self) -> Session {
        let stored = match self.store.load_role().await {
            Ok(role) => role,
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted role; starting anonymous");
                None
            }
        };

        self.transition(SessionTransition::Hydrate(stored));
        let session = self.current();
        tracing::info!(authenticated = session.is_authenticated(), "session hydrated");
        session
    }

    pub fn current(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Exchange credentials for a role. On failure the session is untouched.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Role> {
        let response = self.gateway.login(credentials).await?;
        let role = response.role;

        if let Err(err) = self.store.save_role(&role).await {
            tracing::warn!(error = %err, "role not persisted; session will not survive a restart");
        }

        self.transition(SessionTransition::LoggedIn(role.clone()));
        tracing::info!(%role, "logged in");
        self.announce(SessionEvent::LoggedIn { role: role.clone() });
        Ok(role)
    }

    /// Best-effort server logout. The session ends locally whatever the
    /// server says; its answer is returned for reporting only.
    pub async fn logout(&self) -> ApiResult<()> {
        let outcome = self.gateway.logout().await;
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "server logout failed; ending session locally");
        }

        self.transition(SessionTransition::LoggedOut);
        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = %err, "failed to clear persisted role on logout");
        }

        tracing::info!("logged out");
        self.announce(SessionEvent::LoggedOut);
        outcome
    }

    /// Drop to anonymous after the server rejected the session. The store has
    /// already been cleared by the gateway.
    ///
    /// Returns the session as it was before.
    pub fn expire(&self) -> Session {
        self.transition(SessionTransition::Expired)
    }

    /// Apply one transition under the write lock; returns the previous state.
    fn transition(&self, transition: SessionTransition) -> Session {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::take(&mut *state);
        *state = previous.clone().apply(transition);
        previous
    }

    fn announce(&self, event: SessionEvent) {
        if let Err(err) = self.events.publish(event) {
            tracing::error!(error = ?err, "failed to publish session event");
        }
    }
}
