//! End-to-end auth flows against a real Postgres instance.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use balloon_backend::{
    app,
    error::AppError,
    models::account::Account,
    repositories::account as account_repo,
    utils::jwt::verify_token,
};

mod support;

use support::{
    count_accounts_with_email, deactivate_account, seed_account, test_config, test_pool,
    unique_username, TEST_JWT_SECRET,
};

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn get_me(token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn register_succeeds_exactly_once_for_a_given_identity() {
    let pool = test_pool().await;
    let username = unique_username("alice");
    let email = format!("{username}@example.com");

    let (status, body) = send(
        app(pool.clone(), test_config()),
        post_json(
            "/auth/register",
            json!({ "username": username, "email": email, "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"].as_str(), Some(username.as_str()));
    assert_eq!(body["user"]["isVerified"], false);
    assert!(!body["token"].as_str().unwrap_or_default().is_empty());

    // Same email, fresh username: rejected without writing a second row.
    let (status, body) = send(
        app(pool.clone(), test_config()),
        post_json(
            "/auth/register",
            json!({ "username": unique_username("bob"), "email": email, "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");
    assert_eq!(count_accounts_with_email(&pool, &email).await, 1);

    // Same username, fresh email: also rejected, also no write.
    let other_email = format!("{}@example.com", unique_username("bob"));
    let (status, body) = send(
        app(pool.clone(), test_config()),
        post_json(
            "/auth/register",
            json!({ "username": username, "email": other_email, "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");
    assert_eq!(count_accounts_with_email(&pool, &other_email).await, 0);
}

#[tokio::test]
async fn duplicate_insert_past_the_precheck_maps_to_conflict() {
    // Two registrations racing past the uniqueness pre-check both reach the
    // insert; the unique index stops the loser and the error must surface as
    // the same 409 the pre-check would have produced.
    let pool = test_pool().await;
    let username = unique_username("race");
    let email = format!("{username}@example.com");

    let first = Account::new(
        username.clone(),
        email.clone(),
        "hash-a".into(),
        String::new(),
    );
    account_repo::create_account(&pool, &first)
        .await
        .expect("first insert");

    let second = Account::new(
        username,
        format!("{}@example.com", unique_username("race")),
        "hash-b".into(),
        String::new(),
    );
    let err = account_repo::create_account(&pool, &second)
        .await
        .expect_err("second insert must trip the unique index");

    let response = AppError::from(err).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn login_round_trip_issues_a_verifiable_token() {
    let pool = test_pool().await;
    let username = unique_username("carol");
    let email = format!("{username}@example.com");
    seed_account(&pool, &username, &email, "secret1").await;

    let (status, body) = send(
        app(pool.clone(), test_config()),
        post_json(
            "/auth/login",
            json!({ "email": email, "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let token = body["token"].as_str().expect("token");
    let claims = verify_token(token, TEST_JWT_SECRET).expect("verify token");
    assert_eq!(claims.username, username);

    let (status, body) = send(
        app(pool.clone(), test_config()),
        post_json(
            "/auth/login",
            json!({ "email": email, "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_excludes_deactivated_accounts() {
    let pool = test_pool().await;
    let username = unique_username("dave");
    let email = format!("{username}@example.com");
    let account = seed_account(&pool, &username, &email, "secret1").await;
    deactivate_account(&pool, &account.id).await;

    // Correct credentials, inactive row: indistinguishable from a bad login.
    let (status, body) = send(
        app(pool.clone(), test_config()),
        post_json(
            "/auth/login",
            json!({ "email": email, "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn find_by_id_is_idempotent_and_never_carries_the_hash() {
    let pool = test_pool().await;
    let username = unique_username("erin");
    let email = format!("{username}@example.com");
    let account = seed_account(&pool, &username, &email, "secret1").await;

    let first = account_repo::find_by_id(&pool, &account.id)
        .await
        .expect("lookup")
        .expect("account exists");
    let second = account_repo::find_by_id(&pool, &account.id)
        .await
        .expect("lookup")
        .expect("account exists");

    let first = serde_json::to_value(first).expect("serialize");
    let second = serde_json::to_value(second).expect("serialize");
    assert_eq!(first, second);

    let rendered = first.to_string();
    assert!(!rendered.contains("password"));
    assert!(!rendered.contains("hash"));
    assert_eq!(first["username"].as_str(), Some(username.as_str()));
}

#[tokio::test]
async fn me_resolves_the_profile_until_the_account_is_deactivated() {
    let pool = test_pool().await;
    let username = unique_username("frank");
    let email = format!("{username}@example.com");
    seed_account(&pool, &username, &email, "secret1").await;

    let (_, login_body) = send(
        app(pool.clone(), test_config()),
        post_json(
            "/auth/login",
            json!({ "email": email, "password": "secret1" }),
        ),
    )
    .await;
    let token = login_body["token"].as_str().expect("token").to_string();

    let (status, body) = send(app(pool.clone(), test_config()), get_me(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"].as_str(), Some(email.as_str()));

    let id = body["user"]["id"].as_str().expect("id").to_string();
    deactivate_account(&pool, &id).await;

    // The token is still cryptographically valid, but the account no longer
    // resolves.
    let (status, body) = send(app(pool.clone(), test_config()), get_me(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}
