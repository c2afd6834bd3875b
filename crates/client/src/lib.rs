//! `trafficdesk-client`
//!
//! **Responsibility:** the administrative client for the traffic-violation
//! service.
//!
//! This crate provides:
//! - A persistent session store remembering the signed-in role
//! - The API gateway every backend call goes through (with global 401 recovery)
//! - The session state machine, navigator and notification channel
//! - Headless view controllers and a terminal shell on top of them
//!
//! The backend stays the authority; the client only caches the role.

pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod notify;
pub mod render;
pub mod session;
pub mod shell;
pub mod store;
pub mod views;

#[cfg(test)]
mod test_support;

pub use app::App;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use gateway::{ApiGateway, SessionBus};
pub use navigation::{Location, Navigator, Route, ViewToken};
pub use notify::{Notification, Notifier, Severity};
pub use session::SessionManager;
pub use store::{InMemorySessionStore, SessionStore, SqliteSessionStore, StoreError};
