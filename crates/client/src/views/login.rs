//! Login page.

use trafficdesk_auth::{Credentials, Role};

use crate::app::App;
use crate::navigation::Route;
use crate::views::{ViewContext, ViewError, ViewResult};

#[derive(Debug, Clone)]
pub struct LoginView {
    ctx: ViewContext,
}

impl LoginView {
    /// Mount the login page. A signed-in user is sent to the dashboard
    /// instead and gets `None`.
    pub fn mount(app: &App) -> Option<Self> {
        if app.session.current().is_authenticated() {
            app.navigator.go(Route::Dashboard);
            return None;
        }
        Some(Self {
            ctx: ViewContext::mount(app),
        })
    }

    /// Where a successful login will lead.
    pub fn return_to(&self) -> String {
        self.ctx
            .app()
            .navigator
            .current()
            .from
            .unwrap_or_else(|| Route::Dashboard.path().to_string())
    }

    /// Every failure is reported here, a rejected password included.
    pub async fn submit(&self, credentials: Credentials) -> ViewResult<Role> {
        let app = self.ctx.app();
        if credentials.badge_number.trim().is_empty() || credentials.password.is_empty() {
            return self.ctx.invalid("Badge number and password are required");
        }

        let return_to = self.return_to();
        match app.session.login(&credentials).await {
            Ok(role) => {
                // The session is established either way; a replaced form neither
                // announces it nor moves the user.
                if self.ctx.is_current() {
                    app.notifier.success("Login successful");
                    app.open(&return_to);
                }
                Ok(role)
            }
            Err(err) => {
                if self.ctx.is_current() {
                    app.notifier.error(err.message_or("Login failed"));
                }
                Err(ViewError::Api(err))
            }
        }
    }
}
