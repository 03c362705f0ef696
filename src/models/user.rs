use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// User role. A closed enum so an unrecognized role can never deserialize,
/// let alone grant anything: whatever is not `Admin` holds no admin rights.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A user record as stored. The password hash never leaves the server;
/// responses go through [`UserResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, full_name: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            full_name,
            password_hash,
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Public shape of a user in API responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Admin-only update payload for a user record.
#[derive(Debug, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_with_exact_tags() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"User\"");
    }

    #[test]
    fn test_unknown_role_fails_to_deserialize() {
        // Case-sensitive match; anything else is rejected at the boundary.
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
        assert!(serde_json::from_str::<Role>("\"Superuser\"").is_err());
    }

    #[test]
    fn test_new_user_is_active() {
        let user = User::new(
            "a@example.com".into(),
            "A".into(),
            "hash".into(),
            Role::User,
        );
        assert!(user.is_active);
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_user_update_validation() {
        let update = UserUpdate {
            email: Some("not-an-email".into()),
            full_name: None,
            role: None,
        };
        assert!(update.validate().is_err());

        let update = UserUpdate {
            email: Some("ok@example.com".into()),
            full_name: Some("Full Name".into()),
            role: Some(Role::Admin),
        };
        assert!(update.validate().is_ok());
    }
}
