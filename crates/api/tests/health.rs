//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

/// Clients written against the trailing-slash URLs keep working.
#[sqlx::test(migrations = "../../db/migrations")]
async fn trailing_slash_is_accepted(pool: PgPool) {
    let app = common::build_test_app(pool);

    let with_slash = get(app.clone(), "/api/v1/categories/").await;
    assert_eq!(with_slash.status(), StatusCode::OK);

    let without_slash = get(app, "/api/v1/categories").await;
    assert_eq!(without_slash.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_list_has_page_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/titles/").await).await;

    assert_eq!(json["count"], 0);
    assert!(json["next"].is_null());
    assert!(json["previous"].is_null());
    assert_eq!(json["results"], serde_json::json!([]));
}
