//! Dashboard: entry cards to every section.

use serde::Serialize;

use crate::app::App;
use crate::navigation::Route;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCard {
    pub title: &'static str,
    pub description: &'static str,
    pub route: Route,
    /// Cards for admin-only routes stay visible but disabled for other roles.
    pub enabled: bool,
}

const CARDS: [(&str, &str, Route); 6] = [
    (
        "Users List",
        "View list of all traffic personnel and administrators.",
        Route::Users,
    ),
    (
        "Register Personnel",
        "Create an account for a new officer or administrator.",
        Route::RegisterUser,
    ),
    (
        "Rules Management",
        "View and manage traffic rules and fines.",
        Route::Rules,
    ),
    (
        "Records Management",
        "View and manage traffic violation records.",
        Route::Records,
    ),
    (
        "Add New Record",
        "Create a new traffic violation record.",
        Route::AddRecord,
    ),
    (
        "Search Records",
        "Find a violation record by license number.",
        Route::SearchRecord,
    ),
];

#[derive(Debug, Clone)]
pub struct DashboardView {
    cards: Vec<DashboardCard>,
}

impl DashboardView {
    pub fn mount(app: &App) -> Self {
        let is_admin = app.session.current().is_admin();
        let cards = CARDS
            .into_iter()
            .map(|(title, description, route)| DashboardCard {
                title,
                description,
                route,
                enabled: !route.admin_only() || is_admin,
            })
            .collect();
        Self { cards }
    }

    pub fn cards(&self) -> &[DashboardCard] {
        &self.cards
    }
}
