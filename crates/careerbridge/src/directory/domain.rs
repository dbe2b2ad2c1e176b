use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, fixed at creation. There is no update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Employer,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }

    /// Case-insensitive parse; stored values are always lowercase.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "employer" => Some(Role::Employer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Stored record in the `users` collection, keyed by the identity-provider id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile attributes captured at account creation, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserProfile {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
    #[serde(default)]
    pub company: Option<String>,
}
