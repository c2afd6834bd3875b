//! Traffic rules management.

use trafficdesk_core::{Rule, RuleDraft, RuleId, filter_rules, find_by_id};

use crate::app::App;
use crate::views::{ViewContext, ViewResult};

#[derive(Debug, Clone)]
pub struct RulesView {
    ctx: ViewContext,
    rules: Vec<Rule>,
    filter: String,
}

impl RulesView {
    pub fn mount(app: &App) -> Self {
        Self {
            ctx: ViewContext::mount(app),
            rules: Vec::new(),
            filter: String::new(),
        }
    }

    pub async fn load(&mut self) -> ViewResult<()> {
        let result = self.ctx.app().gateway.list_rules().await;
        self.rules = self.ctx.settle(result, "Error fetching rules")?;
        Ok(())
    }

    pub fn set_filter(&mut self, term: impl Into<String>) {
        self.filter = term.into();
    }

    /// Rules matching the current title filter.
    pub fn visible(&self) -> Vec<&Rule> {
        filter_rules(&self.rules, &self.filter)
    }

    pub fn find(&self, id: &RuleId) -> Option<&Rule> {
        find_by_id(&self.rules, id)
    }

    /// Create a rule, or update `existing` when given, then refresh the list.
    pub async fn save(&mut self, existing: Option<&RuleId>, draft: RuleDraft) -> ViewResult<()> {
        let app = self.ctx.app().clone();
        match existing {
            Some(id) => {
                let result = app.gateway.update_rule(id, &draft).await;
                self.ctx.settle(result, "Error saving rule")?;
                app.notifier.success("Rule updated successfully");
            }
            None => {
                let result = app.gateway.create_rule(&draft).await;
                self.ctx.settle(result, "Error saving rule")?;
                app.notifier.success("Rule created successfully");
            }
        }
        self.load().await
    }

    pub async fn delete(&mut self, id: &RuleId) -> ViewResult<()> {
        let app = self.ctx.app().clone();
        let result = app.gateway.delete_rule(id).await;
        self.ctx.settle(result, "Error deleting rule")?;
        app.notifier.success("Rule deleted successfully");
        self.load().await
    }
}
