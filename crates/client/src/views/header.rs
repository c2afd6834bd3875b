//! Header bar: who is signed in, and logout.

use trafficdesk_auth::Session;

use crate::app::App;
use crate::error::ApiError;
use crate::views::{ViewContext, ViewError, ViewResult};

#[derive(Debug, Clone)]
pub struct HeaderView {
    ctx: ViewContext,
}

impl HeaderView {
    pub fn mount(app: &App) -> Self {
        Self {
            ctx: ViewContext::mount(app),
        }
    }

    pub fn session(&self) -> Session {
        self.ctx.app().session.current()
    }

    /// Log out; the coordinator moves to the login page. The local session
    /// ends even when the server call fails; that failure is still reported.
    pub async fn logout(&self) -> ViewResult<()> {
        let app = self.ctx.app();
        let outcome = app.session.logout().await;

        match outcome {
            Ok(()) => {
                app.notifier.success("Logged out successfully");
                Ok(())
            }
            Err(ApiError::Unauthenticated) => Err(ViewError::SessionExpired),
            Err(err) => {
                app.notifier.error("Error logging out");
                Err(ViewError::Api(err))
            }
        }
    }
}
