//! Credential store queries. All account reads and writes go through here;
//! callers decide which projection they are allowed to forward.

use chrono::Utc;
use sqlx::PgPool;

use crate::models::account::{Account, AccountResponse};

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, bio, is_verified, is_active, \
     avatar_url, created_at, last_login";

const PROJECTION_COLUMNS: &str =
    "id, username, email, bio, is_verified, avatar_url, created_at, last_login";

/// Returns the id of an existing account holding either the username or the
/// email, used as the uniqueness pre-check before insert.
pub async fn find_conflict(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM accounts WHERE username = $1 OR email = $2")
        .bind(username)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn create_account(pool: &PgPool, account: &Account) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts (id, username, email, password_hash, bio, is_verified, is_active, \
         avatar_url, created_at, last_login) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(&account.id)
    .bind(&account.username)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(&account.bio)
    .bind(account.is_verified)
    .bind(account.is_active)
    .bind(&account.avatar_url)
    .bind(account.created_at)
    .bind(account.last_login)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Login lookup: includes the password hash, excludes inactive accounts.
/// The caller must never forward the hash past the comparison.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1 AND is_active = true"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Current-user lookup: fetches the hash-free projection directly, so the
/// hash never enters this code path at all.
pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<AccountResponse>, sqlx::Error> {
    sqlx::query_as::<_, AccountResponse>(&format!(
        "SELECT {PROJECTION_COLUMNS} FROM accounts WHERE id = $1 AND is_active = true"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Best-effort telemetry write; two concurrent logins may race and the last
/// write wins.
pub async fn touch_last_login(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE accounts SET last_login = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
}
