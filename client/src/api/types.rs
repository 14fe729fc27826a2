//! Wire types for the auth API, mirroring the server's JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Server-issued user projection; cached locally as the session snapshot.
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Envelope returned by register and login.
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Envelope returned by the current-user endpoint.
pub struct MeResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Error envelope shared by every failing endpoint.
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with an error envelope.
    #[error("{message}")]
    Server {
        status: u16,
        error: String,
        message: String,
    },
    /// The request never produced a usable response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The response body did not match the expected shape.
    #[error("failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message suitable for direct display. Network and decode failures
    /// collapse into a generic connectivity message; the server's own
    /// message is shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, error, .. } => {
                if message.is_empty() {
                    error.clone()
                } else {
                    message.clone()
                }
            }
            ApiError::Network(_) | ApiError::Decode(_) => {
                "A network error occurred. Please check your connection.".to_string()
            }
        }
    }

    /// True when the server rejected the presented credentials or token.
    /// Used to distinguish "this session is dead" from "the network is".
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::Server {
                status: 401 | 403 | 404,
                ..
            }
        )
    }
}
