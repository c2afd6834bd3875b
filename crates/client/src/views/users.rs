//! Personnel list and admin-only registration.

use trafficdesk_core::{NewPersonnel, Personnel};

use crate::app::App;
use crate::navigation::Route;
use crate::views::{ViewContext, ViewResult};

#[derive(Debug, Clone)]
pub struct UsersView {
    ctx: ViewContext,
    users: Vec<Personnel>,
}

impl UsersView {
    pub fn mount(app: &App) -> Self {
        Self {
            ctx: ViewContext::mount(app),
            users: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> ViewResult<&[Personnel]> {
        let result = self.ctx.app().gateway.list_personnel().await;
        self.users = self.ctx.settle(result, "Error fetching users")?;
        Ok(&self.users)
    }

    pub fn users(&self) -> &[Personnel] {
        &self.users
    }
}

#[derive(Debug, Clone)]
pub struct RegisterView {
    ctx: ViewContext,
}

impl RegisterView {
    pub fn mount(app: &App) -> Self {
        Self {
            ctx: ViewContext::mount(app),
        }
    }

    pub async fn submit(&self, registration: NewPersonnel) -> ViewResult<()> {
        if let Err(err) = registration.validate() {
            return self.ctx.invalid(err.message());
        }

        let app = self.ctx.app();
        let result = app.gateway.register_personnel(&registration).await;
        self.ctx.settle_reporting(result, "Registration failed")?;

        app.notifier.success("User registered successfully");
        app.open_route(Route::Users);
        Ok(())
    }
}
