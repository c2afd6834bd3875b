//! Record lookup by licence number.

use trafficdesk_core::ViolationRecord;

use crate::app::App;
use crate::views::{ViewContext, ViewError, ViewResult};

#[derive(Debug, Clone)]
pub struct SearchView {
    ctx: ViewContext,
    result: Option<ViolationRecord>,
}

impl SearchView {
    pub fn mount(app: &App) -> Self {
        Self {
            ctx: ViewContext::mount(app),
            result: None,
        }
    }

    pub fn result(&self) -> Option<&ViolationRecord> {
        self.result.as_ref()
    }

    /// Look a licence number up. No match is not an error: the result is
    /// cleared and an info notification raised.
    pub async fn search(&mut self, license_number: &str) -> ViewResult<Option<&ViolationRecord>> {
        let license_number = license_number.trim();
        if license_number.is_empty() {
            return self.ctx.invalid("Enter a license number");
        }

        let result = self.ctx.app().gateway.search_record(license_number).await;
        match self.ctx.settle(result, "Error searching record") {
            Ok(found) => {
                if found.is_none() {
                    self.ctx.app().notifier.info("No record found");
                }
                self.result = found;
                Ok(self.result.as_ref())
            }
            Err(err @ ViewError::Api(_)) => {
                self.result = None;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}
