use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open set of profile fields stored alongside the credential fields.
pub type Profile = Map<String, Value>;

/// Keys owned by the account store; never accepted from caller payloads.
pub const RESERVED_FIELDS: [&str; 7] = [
    "username",
    "passwordHash",
    "passwordSalt",
    "createdAt",
    "lastLogin",
    "updatedAt",
    "passwordChangedAt",
];

/// Persisted account record, one entry of the user table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Sanitized record: everything but the password material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub profile: Profile,
}

impl From<&UserRecord> for UserProfile {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.username.clone(),
            created_at: record.created_at,
            last_login: record.last_login,
            updated_at: record.updated_at,
            password_changed_at: record.password_changed_at,
            profile: record.profile.clone(),
        }
    }
}

/// Returned by registration: the username only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedUser {
    pub username: String,
}

/// Drop reserved keys from a caller-supplied payload.
pub fn strip_reserved(mut fields: Profile) -> Profile {
    for key in RESERVED_FIELDS {
        fields.remove(key);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> UserRecord {
        let mut profile = Profile::new();
        profile.insert("displayName".into(), json!("Alice"));
        UserRecord {
            username: "alice".into(),
            password_hash: "ab".repeat(64),
            password_salt: "cd".repeat(16),
            created_at: Utc::now(),
            last_login: None,
            updated_at: None,
            password_changed_at: None,
            profile,
        }
    }

    #[test]
    fn record_uses_camel_case_and_flattens_profile() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("passwordHash"));
        assert!(obj.contains_key("passwordSalt"));
        assert!(obj.contains_key("createdAt"));
        assert_eq!(obj["lastLogin"], Value::Null);
        assert!(!obj.contains_key("updatedAt"));
        assert_eq!(obj["displayName"], json!("Alice"));
    }

    #[test]
    fn reads_record_written_by_older_clients() {
        let raw = json!({
            "username": "bob",
            "passwordHash": "00",
            "passwordSalt": "11",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "lastLogin": null,
            "email": "bob@example.com",
            "favoriteConsole": "GBA"
        });
        let record: UserRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.username, "bob");
        assert_eq!(record.last_login, None);
        assert_eq!(record.profile.len(), 2);
        assert_eq!(record.profile["email"], json!("bob@example.com"));
    }

    #[test]
    fn profile_excludes_password_material() {
        let value = serde_json::to_value(UserProfile::from(&sample())).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("passwordHash"));
        assert!(!obj.contains_key("passwordSalt"));
        assert_eq!(obj["username"], json!("alice"));
        assert_eq!(obj["displayName"], json!("Alice"));
    }

    #[test]
    fn strip_reserved_keeps_profile_fields() {
        let fields = json!({
            "username": "mallory",
            "passwordHash": "x",
            "passwordSalt": "y",
            "createdAt": "2020-01-01T00:00:00Z",
            "theme": "dark"
        });
        let stripped = strip_reserved(fields.as_object().unwrap().clone());
        assert_eq!(Value::Object(stripped), json!({"theme": "dark"}));
    }
}
