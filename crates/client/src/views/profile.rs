//! The signed-in user's own profile.

use trafficdesk_core::{PasswordChange, Profile, ProfileUpdate};

use crate::app::App;
use crate::views::{ViewContext, ViewError, ViewResult};

#[derive(Debug, Clone)]
pub struct ProfileView {
    ctx: ViewContext,
    profile: Option<Profile>,
}

impl ProfileView {
    pub fn mount(app: &App) -> Self {
        Self {
            ctx: ViewContext::mount(app),
            profile: None,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub async fn load(&mut self) -> ViewResult<&Profile> {
        let result = self.ctx.app().gateway.get_profile().await;
        let profile = self.ctx.settle(result, "Error fetching profile")?;
        Ok(self.profile.insert(profile))
    }

    /// Editable fields pre-filled from the displayed profile.
    pub fn edit(&self) -> Option<ProfileUpdate> {
        self.profile.as_ref().map(ProfileUpdate::from)
    }

    /// Save edits. The displayed profile changes only when the server accepts them.
    pub async fn save(&mut self, update: ProfileUpdate) -> ViewResult<()> {
        let app = self.ctx.app().clone();
        let result = app.gateway.update_profile(&update).await;
        self.ctx.settle(result, "Error updating profile")?;

        if let Some(profile) = self.profile.as_mut() {
            profile.apply(&update);
        }
        app.notifier.success("Profile updated successfully");
        Ok(())
    }

    /// Change the password; a confirmation mismatch never reaches the server.
    pub async fn change_password(&self, current: String, new: String, confirm: &str) -> ViewResult<()> {
        let app = self.ctx.app();
        let change = match PasswordChange::confirmed(current, new, confirm) {
            Ok(change) => change,
            Err(err) => {
                app.notifier.error(err.message());
                return Err(ViewError::Invalid(err.message().to_string()));
            }
        };

        let result = app.gateway.change_password(&change).await;
        self.ctx.settle(result, "Error changing password")?;
        app.notifier.success("Password changed successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use trafficdesk_auth::Role;

    use super::*;
    use crate::navigation::Route;
    use crate::notify::Severity;
    use crate::store::InMemorySessionStore;
    use crate::test_support::offline_app;

    fn profile() -> Profile {
        Profile {
            name: "Asha".into(),
            badge_number: "4412".into(),
            mobile: "98".into(),
            address: "Ward 1".into(),
            role: "officer".into(),
        }
    }

    #[tokio::test]
    async fn failed_save_leaves_the_displayed_profile_unchanged() {
        let app = offline_app(InMemorySessionStore::with_role(Role::OFFICER)).await;
        app.open_route(Route::Profile);
        let mut view = ProfileView::mount(&app);
        view.profile = Some(profile());

        let mut update = view.edit().unwrap();
        update.name = "Asha K".into();
        assert!(view.save(update).await.is_err());

        assert_eq!(view.profile(), Some(&profile()));
        assert_eq!(app.notifier.current().message, "Error updating profile");
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_an_error_notification() {
        let app = offline_app(InMemorySessionStore::with_role(Role::OFFICER)).await;
        let view = ProfileView::mount(&app);

        let err = view
            .change_password("old".into(), "new1".into(), "new2")
            .await
            .unwrap_err();
        assert_eq!(err, ViewError::Invalid("New passwords do not match".into()));
        let note = app.notifier.current();
        assert_eq!(note.message, "New passwords do not match");
        assert_eq!(note.severity, Severity::Error);
    }
}
