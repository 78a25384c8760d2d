/// HTTP surface tests that run without a database
///
/// These exercise everything that resolves before the store is touched:
/// the public banner, the token rejection taxonomy, request validation,
/// and the 503 mapping when the store is unreachable. The router is real;
/// only the database behind it is absent.
mod common;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;
use tasknest_shared::auth::jwt::TokenType;
use tasknest_shared::models::id::UserId;

/// A token the offline router accepts (same secret, fresh identity)
fn valid_token() -> String {
    common::test_codec()
        .issue(UserId::new(), TokenType::Access)
        .unwrap()
}

#[tokio::test]
async fn test_banner() {
    let mut app = common::offline_app();

    let (status, body) = common::send(&mut app, common::bare_request("GET", "/", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "TaskNest API");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_degrades_without_database() {
    let mut app = common::offline_app();

    let (status, body) = common::send(&mut app, common::bare_request("GET", "/health", None)).await;

    // Unreachable database degrades the report; the endpoint still succeeds
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_tasks_require_token() {
    let mut app = common::offline_app();

    let (status, body) =
        common::send(&mut app, common::bare_request("GET", "/api/tasks", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_TOKEN_MISSING");
    assert_eq!(body["message"], "Token required");
    assert_eq!(body["status_code"], 401);
}

#[tokio::test]
async fn test_tasks_reject_wrong_scheme() {
    let mut app = common::offline_app();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/tasks")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = common::send(&mut app, request).await;

    // A non-Bearer scheme reads the same as no token at all
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_TOKEN_MISSING");
}

#[tokio::test]
async fn test_tasks_reject_garbage_token() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::bare_request("GET", "/api/tasks", Some("not.a.token")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_TOKEN_INVALID");
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_tasks_reject_expired_token() {
    let mut app = common::offline_app();

    let token = common::test_codec()
        .issue_with_expiration(UserId::new(), TokenType::Access, Duration::seconds(-60))
        .unwrap();

    let (status, body) = common::send(
        &mut app,
        common::bare_request("GET", "/api/tasks", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_TOKEN_EXPIRED");
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn test_tasks_reject_foreign_signature() {
    let mut app = common::offline_app();

    let foreign_codec =
        tasknest_shared::auth::jwt::TokenCodec::new("another-secret-also-32-bytes-long!!").unwrap();
    let token = foreign_codec
        .issue(UserId::new(), TokenType::Access)
        .unwrap();

    let (status, body) = common::send(
        &mut app,
        common::bare_request("GET", "/api/tasks", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_TOKEN_INVALID");
}

#[tokio::test]
async fn test_valid_token_reaches_store_boundary() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::bare_request("GET", "/api/tasks", Some(&valid_token())),
    )
    .await;

    // Authentication passed; the failure is the unreachable store
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "DATABASE_UNAVAILABLE");
    assert_eq!(body["message"], "Database temporarily unavailable");
    assert_eq!(body["status_code"], 503);
}

#[tokio::test]
async fn test_signup_rejects_malformed_email() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": "not-an-email", "password": "long-enough-pw" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_signup_rejects_short_password() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": "user@example.com", "password": "short" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "AUTH_WEAK_PASSWORD");
    assert_eq!(
        body["message"],
        "Password must be between 8 and 72 characters"
    );
}

#[tokio::test]
async fn test_signup_rejects_overlong_password() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": "user@example.com", "password": "x".repeat(73) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "AUTH_WEAK_PASSWORD");
}

#[tokio::test]
async fn test_signin_rejects_malformed_email() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::json_request(
            "POST",
            "/api/auth/signin",
            None,
            &json!({ "email": "nope", "password": "whatever-pw" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_rejects_unknown_sort_field() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::bare_request("GET", "/api/tasks?sort=owner", Some(&valid_token())),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_SORT_FIELD");
    assert_eq!(body["message"], "Invalid sort field: owner");
}

#[tokio::test]
async fn test_list_rejects_unknown_status_filter() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::bare_request("GET", "/api/tasks?status=archived", Some(&valid_token())),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "status");
}

#[tokio::test]
async fn test_create_task_rejects_blank_title() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::json_request(
            "POST",
            "/api/tasks",
            Some(&valid_token()),
            &json!({ "title": "" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "title");
}

#[tokio::test]
async fn test_patch_rejects_oversize_title() {
    let mut app = common::offline_app();

    let uri = format!("/api/tasks/{}", uuid::Uuid::new_v4());
    let (status, body) = common::send(
        &mut app,
        common::json_request(
            "PATCH",
            &uri,
            Some(&valid_token()),
            &json!({ "title": "x".repeat(256) }),
        ),
    )
    .await;

    // Field bounds are checked before the ownership guard touches the store
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_task_rejects_oversize_tag() {
    let mut app = common::offline_app();

    let (status, body) = common::send(
        &mut app,
        common::json_request(
            "POST",
            "/api/tasks",
            Some(&valid_token()),
            &json!({ "title": "Tagged", "tags": ["ok", "y".repeat(51)] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "tags");
}
