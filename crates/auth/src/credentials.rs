//! Login payloads.

use serde::{Deserialize, Serialize};

use crate::Role;

/// Badge number + password, alive only for the duration of a login call.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub badge_number: String,
    pub password: String,
}

impl Credentials {
    pub fn new(badge_number: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            badge_number: badge_number.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("badge_number", &self.badge_number)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login reply. Only `role` is interpreted; anything else the
/// server sends is kept for display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub role: Role,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
