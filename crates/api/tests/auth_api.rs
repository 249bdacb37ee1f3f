//! HTTP-level integration tests for signup and token exchange.

mod common;

use axum::http::StatusCode;
use axum::response::Response;
use common::{body_json, extract_code, get_auth, post_json};
use serde_json::json;
use sqlx::PgPool;
use yamdb_api::router::App;
use yamdb_core::roles::Role;
use yamdb_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn signup(app: App, username: &str, email: &str) -> Response {
    post_json(
        app,
        "/api/v1/auth/signup/",
        json!({ "username": username, "email": email }),
    )
    .await
}

async fn exchange(app: App, username: &str, code: &str) -> Response {
    post_json(
        app,
        "/api/v1/auth/token/",
        json!({ "username": username, "confirmation_code": code }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_creates_user_and_mails_code(pool: PgPool) {
    let (app, mailer) = common::build_test_app_with_mailer(pool.clone());

    let response = signup(app, "newbie", "newbie@example.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["username"], "newbie");
    assert_eq!(json["email"], "newbie@example.com");

    let user = UserRepo::find_by_username(&pool, "newbie")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(user.role(), Role::User);

    let message = mailer
        .last_to("newbie@example.com")
        .expect("a confirmation email should be sent");
    let code = extract_code(&message.body);
    assert_eq!(code.len(), yamdb_core::confirmation::CODE_LENGTH);
    // Only the digest is stored.
    assert_ne!(user.confirmation_code_hash.as_deref(), Some(code.as_str()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_rejects_reserved_username(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = signup(app, "me", "me@example.com").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_rejects_invalid_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = signup(app, "someone", "not-an-email").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_signup_reissues_code(pool: PgPool) {
    let (app, mailer) = common::build_test_app_with_mailer(pool);

    signup(app.clone(), "again", "again@example.com").await;
    let first = extract_code(&mailer.last_to("again@example.com").unwrap().body);

    let response = signup(app.clone(), "again", "again@example.com").await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = extract_code(&mailer.last_to("again@example.com").unwrap().body);
    assert_eq!(mailer.sent().len(), 2);

    assert_ne!(first, second);

    // The older code was replaced.
    let stale = exchange(app.clone(), "again", &first).await;
    assert_eq!(stale.status(), StatusCode::BAD_REQUEST);
    let fresh = exchange(app, "again", &second).await;
    assert_eq!(fresh.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_with_taken_email_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    signup(app.clone(), "owner", "shared@example.com").await;
    let response = signup(app, "intruder", "shared@example.com").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_with_taken_username_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    signup(app.clone(), "owner", "owner@example.com").await;
    let response = signup(app, "owner", "other@example.com").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Token exchange
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn code_exchanges_for_working_token_once(pool: PgPool) {
    let (app, mailer) = common::build_test_app_with_mailer(pool);

    signup(app.clone(), "reader", "reader@example.com").await;
    let code = extract_code(&mailer.last_to("reader@example.com").unwrap().body);

    let response = exchange(app.clone(), "reader", &code).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"]
        .as_str()
        .expect("response must contain token")
        .to_string();

    let me = get_auth(app.clone(), "/api/v1/users/me/", &token).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["username"], "reader");

    let reuse = exchange(app, "reader", &code).await;
    assert_eq!(reuse.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_code_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    signup(app.clone(), "guesser", "guesser@example.com").await;
    let response = exchange(app, "guesser", "definitely-wrong").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_username_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = exchange(app, "ghost", "whatever").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reserved_username_is_rejected_on_exchange(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = exchange(app, "me", "whatever").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_without_outstanding_code_is_rejected(pool: PgPool) {
    common::create_user(&pool, "imported", Role::User).await;
    let app = common::build_test_app(pool);

    let response = exchange(app, "imported", "anything").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_code_is_rejected(pool: PgPool) {
    let (app, mailer) = common::build_test_app_with_mailer(pool.clone());

    signup(app.clone(), "late", "late@example.com").await;
    let code = extract_code(&mailer.last_to("late@example.com").unwrap().body);

    let user = UserRepo::find_by_username(&pool, "late").await.unwrap().unwrap();
    UserRepo::set_confirmation_code(
        &pool,
        user.id,
        &yamdb_core::confirmation::hash_confirmation_code(&code),
        chrono::Utc::now() - chrono::Duration::minutes(1),
    )
    .await
    .unwrap();

    let response = exchange(app, "late", &code).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Bearer token handling
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/me/", "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_of_deleted_user_is_unauthorized(pool: PgPool) {
    let user = common::create_user(&pool, "gone", Role::User).await;
    let token = common::token_for(&user);
    UserRepo::delete(&pool, user.id).await.unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/me/", &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
