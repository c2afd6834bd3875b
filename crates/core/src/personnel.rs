//! Traffic personnel accounts and the signed-in user's own profile.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::UserId;
use crate::lenient::{nullable_text, string_or_number};

/// A personnel account as listed by administrators.
///
/// Only the id is required; a row with gaps still lists, with blanks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personnel {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default, deserialize_with = "nullable_text")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub badge_number: String,
    /// Role name as reported by the server (e.g. `admin`, `officer`).
    #[serde(default, deserialize_with = "nullable_text")]
    pub role: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub address: String,
}

impl Entity for Personnel {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Registration payload for a new personnel account.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPersonnel {
    pub name: String,
    pub mobile: String,
    pub address: String,
    pub badge_number: String,
    pub password: String,
}

impl core::fmt::Debug for NewPersonnel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewPersonnel")
            .field("name", &self.name)
            .field("badge_number", &self.badge_number)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl NewPersonnel {
    /// Reject obviously incomplete registrations before they reach the server.
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("mobile", &self.mobile),
            ("address", &self.address),
            ("badgeNumber", &self.badge_number),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

/// The signed-in user's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub badge_number: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile: String,
    #[serde(default)]
    pub address: String,
    pub role: String,
}

impl Profile {
    /// Apply an accepted update to the locally displayed profile.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        self.name.clone_from(&update.name);
        self.mobile.clone_from(&update.mobile);
        self.address.clone_from(&update.address);
    }
}

/// Editable subset of a profile.
///
/// Badge number and role are assigned by administrators and never sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub mobile: String,
    pub address: String,
}

impl From<&Profile> for ProfileUpdate {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            mobile: profile.mobile.clone(),
            address: profile.address.clone(),
        }
    }
}

/// Password change request.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl core::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

impl PasswordChange {
    /// Build a change request, checking the confirmation locally.
    pub fn confirmed(current: String, new: String, confirm: &str) -> DomainResult<Self> {
        if new != confirm {
            return Err(DomainError::validation("New passwords do not match"));
        }
        if new.is_empty() {
            return Err(DomainError::validation("new password is required"));
        }
        Ok(Self {
            current_password: current,
            new_password: new,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personnel_accepts_numeric_badge_and_mobile() {
        let raw = r#"{"_id":"u1","name":"Asha","badgeNumber":4412,"role":"officer","mobile":9800000000}"#;
        let p: Personnel = serde_json::from_str(raw).unwrap();
        assert_eq!(p.badge_number, "4412");
        assert_eq!(p.mobile, "9800000000");
        assert_eq!(p.address, "");
    }

    #[test]
    fn incomplete_rows_do_not_sink_the_list() {
        let raw = r#"[
            {"_id":"u1","name":"Asha","badgeNumber":"1001","role":"admin"},
            {"_id":"u2","name":"Bikash"},
            {"_id":"u3","name":null,"badgeNumber":null,"role":null,"address":null}
        ]"#;
        let listed: Vec<Personnel> = serde_json::from_str(raw).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[1].role, "");
        assert_eq!(listed[1].badge_number, "");
        assert_eq!(listed[2].name, "");
        assert_eq!(listed[2].address, "");
    }

    #[test]
    fn registration_serializes_camel_case_and_hides_password_in_debug() {
        let reg = NewPersonnel {
            name: "Ravi".into(),
            mobile: "98".into(),
            address: "Ward 4".into(),
            badge_number: "77".into(),
            password: "hunter2".into(),
        };
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json["badgeNumber"], "77");
        assert!(!format!("{reg:?}").contains("hunter2"));
    }

    #[test]
    fn registration_requires_every_field() {
        let reg = NewPersonnel {
            name: "Ravi".into(),
            mobile: " ".into(),
            address: "Ward 4".into(),
            badge_number: "77".into(),
            password: "x".into(),
        };
        assert_eq!(
            reg.validate(),
            Err(DomainError::validation("mobile is required"))
        );
    }

    #[test]
    fn password_confirmation_mismatch_is_rejected_locally() {
        let err = PasswordChange::confirmed("old".into(), "new1".into(), "new2").unwrap_err();
        assert_eq!(err, DomainError::validation("New passwords do not match"));

        let ok = PasswordChange::confirmed("old".into(), "new1".into(), "new1").unwrap();
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["currentPassword"], "old");
        assert_eq!(json["newPassword"], "new1");
    }

    #[test]
    fn profile_apply_only_touches_editable_fields() {
        let mut profile = Profile {
            name: "A".into(),
            badge_number: "1".into(),
            mobile: "2".into(),
            address: "3".into(),
            role: "officer".into(),
        };
        profile.apply(&ProfileUpdate {
            name: "B".into(),
            mobile: "5".into(),
            address: "6".into(),
        });
        assert_eq!(profile.name, "B");
        assert_eq!(profile.badge_number, "1");
        assert_eq!(profile.role, "officer");
    }
}
