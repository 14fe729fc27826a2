use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;

use crate::{config::Config, error::AppError, utils::jwt::verify_token};

/// Bearer-token guard for protected routes. Token validity is purely
/// cryptographic: no database is touched here, so an invalid or expired
/// token is rejected before any store access. A missing token is a 401,
/// a token that fails verification is a 403.
pub async fn auth(
    State((_pool, config)): State<(PgPool, Config)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = auth_header
        .and_then(parse_bearer_token)
        .ok_or(AppError::Unauthorized(
            "Access token required",
            "Authentication is required",
        ))?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|_| {
        AppError::Forbidden("Invalid token", "The token is invalid or has expired")
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

pub fn parse_bearer_token(header: &str) -> Option<&str> {
    let token = if let Some(rest) = header.strip_prefix("Bearer ") {
        Some(rest.trim_start())
    } else if let Some(rest) = header.strip_prefix("bearer ") {
        Some(rest.trim_start())
    } else if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| rest.trim_start())
    } else {
        None
    };

    // A bearer scheme with nothing after it is the same as no token at all:
    // it must produce the missing-token 401, not the invalid-token 403.
    token.filter(|token| !token.is_empty())
}
