//! Credential records and the public user view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. Stored as lowercase text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Unknown or missing values fall back to the least privileged role.
    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Stored credential row. The hash never leaves the server.
#[derive(Clone)]
pub struct Credential {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

/// Credential to be inserted on registration
pub struct NewCredential {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
}

/// Public user view returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<&Credential> for User {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id,
            email: credential.email.clone(),
            name: credential.name.clone(),
            role: credential.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential {
            id: 7,
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$v=19$secret-material".to_string(),
            name: "A".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_role_from_db() {
        assert_eq!(Role::from_db(Some("admin")), Role::Admin);
        assert_eq!(Role::from_db(Some("ADMIN")), Role::Admin);
        assert_eq!(Role::from_db(Some("user")), Role::User);
        assert_eq!(Role::from_db(Some("superuser")), Role::User);
        assert_eq!(Role::from_db(None), Role::User);
    }

    #[test]
    fn test_user_view_has_no_hash() {
        let user = User::from(&credential());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "user");
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_credential_debug_redacts_hash() {
        let rendered = format!("{:?}", credential());
        assert!(!rendered.contains("secret-material"));
    }
}
