//! Pedestrian violation records.
//!
//! A record belongs to one licence holder and lists the violations booked
//! against them. Forms may submit placeholder rows with an empty title; those
//! rows are kept on the wire but ignored by every count and total.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::RecordId;
use crate::lenient::{optional_u32, string_or_number};
use crate::value_object::Fine;

/// One booked violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fine: Fine,
}

impl ViolationEntry {
    pub fn new(title: impl Into<String>, fine: Fine) -> Self {
        Self {
            title: title.into(),
            fine,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(deserialize_with = "string_or_number")]
    pub license_num: String,
    pub name: String,
    #[serde(default)]
    pub sex: String,
    #[serde(default, deserialize_with = "optional_u32")]
    pub age: Option<u32>,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub violation_records: Vec<ViolationEntry>,
    /// URL of the uploaded photo, if any.
    #[serde(default)]
    pub image: Option<String>,
}

impl Entity for ViolationRecord {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ViolationRecord {
    /// Violations with a title.
    pub fn violations(&self) -> impl Iterator<Item = &ViolationEntry> {
        self.violation_records.iter().filter(|v| !v.is_blank())
    }

    pub fn violation_count(&self) -> usize {
        self.violations().count()
    }

    pub fn total_fine(&self) -> Fine {
        self.violations().map(|v| v.fine).sum()
    }
}

/// Photo attached to a new record.
#[derive(Clone, PartialEq, Eq)]
pub struct RecordImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl core::fmt::Debug for RecordImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Payload for creating a record (sent as multipart form data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub license_num: String,
    pub name: String,
    pub sex: String,
    pub age: Option<u32>,
    pub dob: String,
    pub address: String,
    pub violation_records: Vec<ViolationEntry>,
    pub image: Option<RecordImage>,
}

impl RecordDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.license_num.trim().is_empty() {
            return Err(DomainError::validation("licenseNum is required"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        Ok(())
    }

    /// Plain text form fields, in submission order.
    pub fn scalar_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("licenseNum", self.license_num.clone()),
            ("name", self.name.clone()),
            ("sex", self.sex.clone()),
            ("age", self.age.map(|a| a.to_string()).unwrap_or_default()),
            ("dob", self.dob.clone()),
            ("address", self.address.clone()),
        ]
    }

    /// The violation list as the JSON string the backend expects in its form field.
    pub fn violations_json(&self) -> DomainResult<String> {
        serde_json::to_string(&self.violation_records)
            .map_err(|e| DomainError::validation(format!("violationRecords: {e}")))
    }
}

/// Partial update for an existing record; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_num: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation_records: Option<Vec<ViolationEntry>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply an accepted patch to a locally held record.
    pub fn apply_to(&self, record: &mut ViolationRecord) {
        if let Some(v) = &self.license_num {
            record.license_num.clone_from(v);
        }
        if let Some(v) = &self.name {
            record.name.clone_from(v);
        }
        if let Some(v) = &self.sex {
            record.sex.clone_from(v);
        }
        if let Some(v) = self.age {
            record.age = Some(v);
        }
        if let Some(v) = &self.dob {
            record.dob.clone_from(v);
        }
        if let Some(v) = &self.address {
            record.address.clone_from(v);
        }
        if let Some(v) = &self.violation_records {
            record.violation_records.clone_from(v);
        }
    }
}
