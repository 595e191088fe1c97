//! User model and account request bodies

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Public profile of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// 1 active, 0 disabled
    #[serde(default)]
    pub status: i64,
    /// 1 administrator, 0 regular user
    #[serde(default)]
    pub is_admin: i64,
    #[serde(default)]
    pub created_at: String,
}

impl User {
    pub const fn is_active(&self) -> bool {
        self.status == 1
    }

    pub const fn is_administrator(&self) -> bool {
        self.is_admin == 1
    }
}

/// Body of `POST /v1/users/login`
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /v1/users/register`
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl fmt::Debug for RegisterUser {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RegisterUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

/// Body of `PUT /v1/users/:id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of `PUT /v1/users/:id/password`
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ChangePassword {
    pub new_password: String,
}

impl fmt::Debug for ChangePassword {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ChangePassword")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_decodes_profile() {
        let user: User = serde_json::from_str(
            r#"{"id": 5, "username": "ada", "email": "ada@example.com", "status": 1, "is_admin": 0, "created_at": "2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user.id, UserId(5));
        assert!(user.is_active());
        assert!(!user.is_administrator());
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let credentials = Credentials::new("ada@example.com", "hunter22");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("[REDACTED]"));

        let change = ChangePassword {
            new_password: "s3cret-value".to_string(),
        };
        assert!(!format!("{change:?}").contains("s3cret-value"));
    }

    #[test]
    fn profile_update_skips_unset_fields() {
        let body = UpdateProfile {
            email: Some("new@example.com".to_string()),
            ..UpdateProfile::default()
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"email": "new@example.com"})
        );
    }
}
