use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Wire shape for every error the API returns: a short machine-readable
/// `error` token and a human-readable `message`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(&'static str, &'static str),
    Unauthorized(&'static str, &'static str),
    Forbidden(&'static str, &'static str),
    NotFound(&'static str, &'static str),
    Conflict(&'static str, &'static str),
    Validation(Vec<String>),
    InternalServerError(anyhow::Error),
}

impl AppError {
    /// Unified failure for unknown email and wrong password, so the two
    /// causes are indistinguishable to the caller.
    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized("Invalid credentials", "Email address or password is incorrect")
    }

    pub fn user_already_exists() -> Self {
        AppError::Conflict(
            "User already exists",
            "This username or email address is already in use",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest(error, message) => {
                (StatusCode::BAD_REQUEST, error.to_string(), message.to_string())
            }
            AppError::Unauthorized(error, message) => {
                (StatusCode::UNAUTHORIZED, error.to_string(), message.to_string())
            }
            AppError::Forbidden(error, message) => {
                (StatusCode::FORBIDDEN, error.to_string(), message.to_string())
            }
            AppError::NotFound(error, message) => {
                (StatusCode::NOT_FOUND, error.to_string(), message.to_string())
            }
            AppError::Conflict(error, message) => {
                (StatusCode::CONFLICT, error.to_string(), message.to_string())
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                errors.join(", "),
            ),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    "A server error occurred. Please try again later.".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse { error, message });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return AppError::NotFound("Not found", "Resource not found");
        }
        // Backstop for two concurrent registrations racing past the
        // uniqueness pre-check: one insert trips the unique index.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::user_already_exists();
            }
        }
        AppError::InternalServerError(err.into())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let detail = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, detail)
                })
            })
            .collect();
        AppError::Validation(messages)
    }
}
