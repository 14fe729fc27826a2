use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::types::{
    ApiError, ApiErrorBody, AuthResponse, LoginRequest, MeResponse, RegisterRequest,
};

/// Thin HTTP client over the auth endpoints. Holds no session state of its
/// own; the session manager supplies the token where one is needed.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(request)
            .send()
            .await?;

        Self::parse(response).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(request)
            .send()
            .await?;

        Self::parse(response).await
    }

    pub async fn me(&self, token: &str) -> Result<MeResponse, ApiError> {
        let response = self
            .client
            .get(format!("{}/auth/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// 2xx parses the success envelope; anything else parses the
    /// `{error, message}` envelope, falling back to the status text when the
    /// body is not what the server promised.
    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            let body = response.json::<ApiErrorBody>().await.unwrap_or_else(|_| {
                ApiErrorBody {
                    error: status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string(),
                    message: String::new(),
                }
            });
            Err(ApiError::Server {
                status: status.as_u16(),
                error: body.error,
                message: body.message,
            })
        }
    }
}
