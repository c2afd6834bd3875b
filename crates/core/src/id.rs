//! Strongly-typed identifiers used across the domain.
//!
//! The backend assigns opaque string ids (`_id`). They are interpolated into
//! request paths, so construction from user input rejects anything that is not
//! a single path segment.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a personnel account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of a traffic rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

/// Identifier of a violation record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

macro_rules! impl_string_id {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_segment(s).map_err(|reason| {
                    DomainError::invalid_id(format!("{}: {}", $name, reason))
                })?;
                Ok(Self(s.to_string()))
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

fn validate_segment(s: &str) -> Result<(), &'static str> {
    if s.trim().is_empty() {
        return Err("must not be empty");
    }
    if s.contains(['/', '?', '#']) || s.chars().any(char::is_whitespace) {
        return Err("must be a single path segment");
    }
    Ok(())
}

impl_string_id!(UserId, "UserId");
impl_string_id!(RuleId, "RuleId");
impl_string_id!(RecordId, "RecordId");
