pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Role;

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, generate_token_pair, verify_token, Claims, TokenKind, TokenPair};

/// Represents the payload for a user login request.
///
/// No length rule on the password here: any wrong guess, however short,
/// must fail the same way ("Invalid email or password."), not with a
/// validation message that hints at the password policy.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Represents the payload for a new user registration request.
///
/// The caller supplies the role. Honoring it lets anyone register as an
/// Admin, which is almost certainly not what was intended; the behavior is
/// kept because callers depend on it, and `Config::allow_caller_role =
/// false` forces `Role::User` instead.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords don't match"))]
    pub password_confirm: String,
    #[serde(default)]
    pub role: Role,
}

/// Payload for exchanging a refresh token for a new access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        // A short password is still a well-formed login attempt; whether it
        // is wrong is decided by the credential check, not by validation.
        let short_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "123".to_string(),
        };
        assert!(short_password_login.validate().is_ok());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            email: "test@example.com".to_string(),
            full_name: "Test User".to_string(),
            password: "password123".to_string(),
            password_confirm: "password123".to_string(),
            role: Role::User,
        };
        assert!(valid_register.validate().is_ok());

        let mismatched = RegisterRequest {
            password_confirm: "different123".to_string(),
            ..valid_register
        };
        assert!(mismatched.validate().is_err());
    }

    #[test]
    fn test_register_role_defaults_to_user() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "a@example.com",
            "full_name": "A",
            "password": "password123",
            "password_confirm": "password123",
        }))
        .unwrap();
        assert_eq!(req.role, Role::User);
    }
}
