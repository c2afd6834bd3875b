use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier assigned by the server.
///
/// Roles are opaque strings at this layer; only `admin` carries meaning on the
/// client (it unlocks admin-only views). Anything else (`officer`, ...) is
/// treated as regular personnel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const OFFICER: Role = Role(Cow::Borrowed("officer"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.as_str() == "admin"
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
