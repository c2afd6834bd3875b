//! Traffic rules and their fines.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::RuleId;
use crate::value_object::Fine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "_id")]
    pub id: RuleId,
    pub title: String,
    pub fine: Fine,
}

impl Entity for Rule {
    type Id = RuleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Create/update payload for a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDraft {
    pub title: String,
    pub fine: Fine,
}

impl RuleDraft {
    pub fn new(title: impl Into<String>, fine: Fine) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("rule title is required"));
        }
        Ok(Self { title, fine })
    }
}

impl From<&Rule> for RuleDraft {
    fn from(rule: &Rule) -> Self {
        Self {
            title: rule.title.clone(),
            fine: rule.fine,
        }
    }
}

/// Case-insensitive title filter; an empty term keeps everything.
pub fn filter_rules<'a>(rules: &'a [Rule], term: &str) -> Vec<&'a Rule> {
    let needle = term.trim().to_lowercase();
    rules
        .iter()
        .filter(|rule| needle.is_empty() || rule.title.to_lowercase().contains(&needle))
        .collect()
}
