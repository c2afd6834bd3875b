//! `trafficdesk-core`: domain building blocks shared by every layer.
//!
//! This crate contains **pure domain** types: identifiers, the three managed
//! resources (personnel, rules, violation records) and their value objects.
//! It does no IO.

pub mod entity;
pub mod error;
pub mod id;
mod lenient;
pub mod personnel;
pub mod record;
pub mod rule;
pub mod value_object;

pub use entity::{Entity, find_by_id, find_by_id_mut, remove_by_id};
pub use error::{DomainError, DomainResult};
pub use id::{RecordId, RuleId, UserId};
pub use personnel::{NewPersonnel, PasswordChange, Personnel, Profile, ProfileUpdate};
pub use record::{RecordDraft, RecordImage, RecordPatch, ViolationEntry, ViolationRecord};
pub use rule::{Rule, RuleDraft, filter_rules};
pub use value_object::{Fine, FineBand};
