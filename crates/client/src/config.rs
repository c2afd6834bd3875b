//! Client configuration resolved from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const API_URL_ENV: &str = "TRAFFICDESK_API_URL";
pub const DATA_DIR_ENV: &str = "TRAFFICDESK_DATA_DIR";
pub const NOTIFY_TIMEOUT_ENV: &str = "TRAFFICDESK_NOTIFY_TIMEOUT_MS";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_millis(6000);

const SESSION_DB_FILE: &str = "session.db";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base URL {0:?}: must be an absolute http(s) URL")]
    InvalidUrl(String),
    #[error("invalid notification timeout {0:?}: expected milliseconds")]
    InvalidTimeout(String),
    #[error("could not determine a data directory; set {DATA_DIR_ENV}")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Fixed base address of the backend; every request is resolved against it.
    pub api_base_url: String,
    /// Directory holding the persistent session store.
    pub data_dir: PathBuf,
    pub notification_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup(API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        validate_url(&api_base_url)?;

        let data_dir = match lookup(DATA_DIR_ENV) {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir()
                .map(|d| d.join("trafficdesk"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let notification_timeout = match lookup(NOTIFY_TIMEOUT_ENV) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_NOTIFY_TIMEOUT,
        };

        Ok(Self {
            api_base_url,
            data_dir,
            notification_timeout,
        })
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        validate_url(&url)?;
        self.api_base_url = url;
        Ok(self)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_DB_FILE)
    }
}

fn validate_url(raw: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidUrl(raw.to_string())),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = ClientConfig::from_lookup(lookup(&[(DATA_DIR_ENV, "/tmp/td")])).unwrap();
        assert_eq!(cfg.api_base_url, DEFAULT_API_URL);
        assert_eq!(cfg.notification_timeout, Duration::from_millis(6000));
        assert_eq!(cfg.session_db_path(), PathBuf::from("/tmp/td/session.db"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://tms.example.org/api/"),
            (DATA_DIR_ENV, "/var/lib/td"),
            (NOTIFY_TIMEOUT_ENV, "1500"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_base_url, "https://tms.example.org/api/");
        assert_eq!(cfg.notification_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(API_URL_ENV, "localhost:8000"), (DATA_DIR_ENV, "/x")])),
            Err(ConfigError::InvalidUrl("localhost:8000".into()))
        );
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(NOTIFY_TIMEOUT_ENV, "soon"), (DATA_DIR_ENV, "/x")])),
            Err(ConfigError::InvalidTimeout("soon".into()))
        );
    }
}
