//! Models for account records and the auth API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of an account. The only place the password hash
/// is allowed to travel; it never crosses the API boundary.
pub struct Account {
    /// Unique identifier, generated at registration.
    pub id: String,
    /// Globally unique display/login name.
    pub username: String,
    /// Globally unique email address.
    pub email: String,
    /// Bcrypt hash of the account password.
    pub password_hash: String,
    /// Optional free-text profile line, empty when not provided.
    pub bio: String,
    /// Whether the account completed email verification.
    pub is_verified: bool,
    /// Inactive accounts are excluded from login and lookup.
    pub is_active: bool,
    /// Optional avatar image reference.
    pub avatar_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last successful login, null until the first one.
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// Constructs a new unverified, active account with a fresh identifier.
    pub fn new(username: String, email: String, password_hash: String, bio: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            bio,
            is_verified: false,
            is_active: true,
            avatar_url: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
/// Public-facing projection of an account returned by the API.
/// Deliberately has no `password_hash` field, so it cannot leak one.
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id,
            username: account.username,
            email: account.email,
            bio: account.bio,
            is_verified: account.is_verified,
            avatar_url: account.avatar_url,
            created_at: account.created_at,
            last_login: account.last_login,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating a new account. Missing string fields deserialize as
/// empty and are rejected by the required-field check, matching the API's
/// treatment of absent and empty values.
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = rules::validate_username))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
/// Credentials submitted by a user attempting to log in.
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
/// Envelope returned by register and login.
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: AccountResponse,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
/// Envelope returned by the current-user endpoint.
pub struct MeResponse {
    pub success: bool,
    pub user: AccountResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn account_response_never_carries_the_hash() {
        let account = Account::new(
            "alice".into(),
            "alice@example.com".into(),
            "$2b$10$hash".into(),
            "hello".into(),
        );
        let response: AccountResponse = account.into();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["isVerified"], Value::Bool(false));
    }

    #[test]
    fn optional_fields_are_skipped_when_null() {
        let account = Account::new("a".into(), "a@b.co".into(), "h".into(), String::new());
        let json = serde_json::to_value(AccountResponse::from(account)).unwrap();
        assert!(json.get("avatarUrl").is_none());
        assert!(json.get("lastLogin").is_none());
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let payload: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(payload.username.is_empty());
        assert!(payload.email.is_empty());
        assert!(payload.password.is_empty());
        assert!(payload.bio.is_none());
    }

    #[test]
    fn register_request_validation_flags_bad_input() {
        let payload: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "email": "not-an-email",
            "password": "short"
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
