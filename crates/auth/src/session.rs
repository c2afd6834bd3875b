//! Client-held session state and its transitions.

use serde::{Serialize, Serializer};

use crate::Role;

/// What the client believes about the current user.
///
/// The enum makes "anonymous with a role" unrepresentable: the wire/view shape
/// `{ isAuthenticated, role }` is derived from it, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { role: Role },
}

/// Every way a session may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransition {
    /// Cold start: adopt whatever role the persistent store remembered.
    Hydrate(Option<Role>),
    /// The server accepted credentials and reported this role.
    LoggedIn(Role),
    /// Explicit logout (server outcome irrelevant).
    LoggedOut,
    /// The server rejected the session cookie.
    Expired,
}

/// Announcements about the session, published on the session event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A call to `endpoint` came back unauthenticated. The persistent role has
    /// already been cleared when this is published.
    Expired { endpoint: String },
    LoggedIn { role: Role },
    LoggedOut,
}

impl Session {
    pub fn hydrate(stored: Option<Role>) -> Self {
        Self::Anonymous.apply(SessionTransition::Hydrate(stored))
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn role(&self) -> Option<&Role> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { role } => Some(role),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(Role::is_admin)
    }

    /// Pure transition function.
    pub fn apply(self, transition: SessionTransition) -> Self {
        match transition {
            SessionTransition::Hydrate(Some(role)) | SessionTransition::LoggedIn(role) => {
                Self::Authenticated { role }
            }
            // Hydration without a stored role leaves an existing session alone;
            // it only ever runs on a fresh (anonymous) state.
            SessionTransition::Hydrate(None) => self,
            SessionTransition::LoggedOut | SessionTransition::Expired => Self::Anonymous,
        }
    }
}

impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Shape<'a> {
            is_authenticated: bool,
            role: Option<&'a Role>,
        }

        Shape {
            is_authenticated: self.is_authenticated(),
            role: self.role(),
        }
        .serialize(serializer)
    }
}
