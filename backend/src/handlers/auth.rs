use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::account::{
        Account, AccountResponse, AuthResponse, LoginRequest, MeResponse, RegisterRequest,
    },
    repositories::account as account_repo,
    utils::{
        jwt::{issue_token, Claims},
        password::{hash_password, verify_password},
    },
};

/// POST /auth/register
///
/// received -> validated -> uniqueness-checked -> hashed -> persisted ->
/// token-issued -> responded. Every failure happens before the insert, so a
/// failed registration leaves no partial state.
pub async fn register(
    State((pool, config)): State<(PgPool, Config)>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    tracing::info!(
        username = %payload.username,
        email = %payload.email,
        "register request received"
    );

    if payload.username.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "username, email, password are required",
            "Username, email and password are required",
        ));
    }
    payload.validate().map_err(register_validation_error)?;

    if account_repo::find_conflict(&pool, &payload.username, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::user_already_exists());
    }

    let password_hash = hash_password(&payload.password, config.bcrypt_cost)?;
    let account = Account::new(
        payload.username,
        payload.email,
        password_hash,
        payload.bio.unwrap_or_default(),
    );
    account_repo::create_account(&pool, &account).await?;

    let token = issue_token(
        &account.id,
        &account.username,
        &config.jwt_secret,
        config.token_validity_days,
    )?;

    tracing::info!(account_id = %account.id, username = %account.username, "account created");

    let response = AuthResponse {
        success: true,
        message: "Account created successfully".to_string(),
        user: AccountResponse::from(account),
        token,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Each validation failure keeps its own error token. Password length is
/// checked before email format, matching the order the checks run in.
fn register_validation_error(errors: validator::ValidationErrors) -> AppError {
    let fields = errors.field_errors();
    if fields.contains_key("password") {
        return AppError::BadRequest(
            "Password too short",
            "Password must be at least 6 characters",
        );
    }
    if fields.contains_key("email") {
        return AppError::BadRequest("Invalid email format", "Please enter a valid email address");
    }
    AppError::from(errors)
}

/// POST /auth/login
///
/// Unknown email and wrong password produce the same error, so the two
/// causes cannot be told apart by the caller.
pub async fn login(
    State((pool, config)): State<(PgPool, Config)>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    tracing::info!(email = %payload.email, "login request received");

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required",
            "Email address and password are required",
        ));
    }

    let account = account_repo::find_by_email(&pool, &payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    ensure_password_matches(&payload.password, &account.password_hash)?;

    // Informational telemetry only: a failed timestamp update must not turn
    // a correct login into an error.
    if let Err(err) = account_repo::touch_last_login(&pool, &account.id).await {
        tracing::warn!(account_id = %account.id, error = %err, "failed to update last_login");
    }

    let token = issue_token(
        &account.id,
        &account.username,
        &config.jwt_secret,
        config.token_validity_days,
    )?;

    tracing::info!(account_id = %account.id, username = %account.username, "login succeeded");

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        user: AccountResponse::from(account),
        token,
    }))
}

/// GET /auth/me
///
/// The bearer middleware has already verified the token; this handler only
/// resolves the verified subject to an active account.
pub async fn me(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeResponse>, AppError> {
    let user = account_repo::find_by_id(&pool, &claims.sub)
        .await?
        .ok_or(AppError::NotFound(
            "User not found",
            "The account no longer exists or has been deactivated",
        ))?;

    Ok(Json(MeResponse {
        success: true,
        user,
    }))
}

pub fn ensure_password_matches(candidate: &str, expected_hash: &str) -> Result<(), AppError> {
    let matches = verify_password(candidate, expected_hash)
        .map_err(AppError::InternalServerError)?;
    if matches {
        Ok(())
    } else {
        Err(AppError::invalid_credentials())
    }
}
