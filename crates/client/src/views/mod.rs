//! Headless view controllers.
//!
//! Each view is mounted against the navigator and keeps the [`ViewToken`] it
//! was mounted with. Gateway results pass through [`ViewContext::settle`]:
//!
//! - `Unauthenticated` has already been handled globally; the view does nothing.
//! - A result arriving after the view was replaced is dropped.
//! - Any other failure raises exactly one error notification and leaves the
//!   view's state untouched.

pub mod dashboard;
pub mod header;
pub mod login;
pub mod profile;
pub mod records;
pub mod rules;
pub mod search;
pub mod users;

use thiserror::Error;

use crate::app::App;
use crate::error::{ApiError, ApiResult};
use crate::navigation::ViewToken;

pub use dashboard::{DashboardCard, DashboardView};
pub use header::HeaderView;
pub use login::LoginView;
pub use profile::ProfileView;
pub use records::{AddRecordView, RecordsView};
pub use rules::RulesView;
pub use search::SearchView;
pub use users::{RegisterView, UsersView};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    /// Rejected locally before any network call.
    #[error("invalid input: {0}")]
    Invalid(String),
    /// The server rejected the session; navigation already moved to login.
    #[error("session expired")]
    SessionExpired,
    /// The view was replaced while the call was in flight.
    #[error("view is no longer displayed")]
    Stale,
    #[error(transparent)]
    Api(ApiError),
}

pub type ViewResult<T> = Result<T, ViewError>;

/// What a mounted view needs: the app handle and its mount token.
#[derive(Debug, Clone)]
pub struct ViewContext {
    app: App,
    token: ViewToken,
}

impl ViewContext {
    pub fn mount(app: &App) -> Self {
        Self {
            app: app.clone(),
            token: app.navigator.mount(),
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn is_current(&self) -> bool {
        self.app.navigator.is_current(&self.token)
    }

    /// Settle a result, reporting failures with a fixed message.
    pub(crate) fn settle<T>(&self, result: ApiResult<T>, failure: &str) -> ViewResult<T> {
        self.settle_with(result, |_| failure.to_string())
    }

    /// Settle a result, reporting failures with the server's message when it
    /// sent one.
    pub(crate) fn settle_reporting<T>(&self, result: ApiResult<T>, fallback: &str) -> ViewResult<T> {
        self.settle_with(result, |err| err.message_or(fallback))
    }

    fn settle_with<T>(
        &self,
        result: ApiResult<T>,
        describe: impl FnOnce(&ApiError) -> String,
    ) -> ViewResult<T> {
        match result {
            Err(ApiError::Unauthenticated) => Err(ViewError::SessionExpired),
            _ if !self.is_current() => {
                tracing::debug!(route = %self.token.route(), "dropping response for replaced view");
                Err(ViewError::Stale)
            }
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(route = %self.token.route(), error = %err, "view action failed");
                self.app.notifier.error(describe(&err));
                Err(ViewError::Api(err))
            }
        }
    }

    /// Reject input locally with a warning.
    pub(crate) fn invalid<T>(&self, message: impl Into<String>) -> ViewResult<T> {
        let message = message.into();
        self.app.notifier.warning(message.clone());
        Err(ViewError::Invalid(message))
    }
}
