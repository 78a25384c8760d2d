/// Integration tests for the TaskNest API
///
/// These tests verify the full system works end-to-end against a real
/// PostgreSQL instance:
/// - Signup and signin flows, including the failure taxonomy
/// - Task CRUD through the HTTP surface
/// - Ownership isolation between accounts
/// - Listing with pagination, filters, and sort specs
///
/// They read `DATABASE_URL` and `JWT_SECRET` from the environment and are
/// ignored by default.
mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use uuid::Uuid;

/// Removes an account created outside a `TestContext`
async fn delete_user_by_email(db: &sqlx::PgPool, email: &str) {
    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(db)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_signup_and_signin_flow() {
    let mut ctx = TestContext::new().await.unwrap();
    let email = format!("flow-{}@example.com", Uuid::new_v4());

    // Signup issues a session immediately
    let (status, body) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": email, "password": common::TEST_PASSWORD, "name": "Flow" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["name"], "Flow");
    assert_eq!(body["user"]["is_active"], true);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["tokens"]["access_token"].is_string());
    assert!(body["tokens"]["refresh_token"].is_string());
    assert_eq!(body["tokens"]["token_type"], "bearer");
    assert_eq!(body["tokens"]["expires_in"], 604_800);
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    // Same account signs back in
    let (status, body) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/auth/signin",
            None,
            &json!({ "email": email, "password": common::TEST_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id.as_str());

    // Wrong password and unknown email produce byte-identical bodies
    let (status, wrong_password) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/auth/signin",
            None,
            &json!({ "email": email, "password": "not-the-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["error"], "AUTH_INVALID_CREDENTIALS");
    assert_eq!(wrong_password["message"], "Invalid credentials");

    let (status, unknown_email) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/auth/signin",
            None,
            &json!({ "email": format!("ghost-{}@example.com", Uuid::new_v4()),
                     "password": common::TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, wrong_password);

    // The email is now taken
    let (status, body) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": email, "password": common::TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AUTH_EMAIL_EXISTS");
    assert_eq!(body["message"], "Email already registered");

    delete_user_by_email(&ctx.db, &email).await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_email_stored_normalized() {
    let mut ctx = TestContext::new().await.unwrap();
    let marker = Uuid::new_v4();
    let noisy = format!("  MiXeD-{}@Example.COM  ", marker);
    let normalized = format!("mixed-{}@example.com", marker);

    let (status, body) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": noisy, "password": common::TEST_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], normalized);

    // Signin with the already-normalized form finds the same account
    let (status, _) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/auth/signin",
            None,
            &json!({ "email": normalized, "password": common::TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    delete_user_by_email(&ctx.db, &normalized).await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_task_crud_lifecycle() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    // Create
    let (status, task) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/tasks",
            Some(&token),
            &json!({
                "title": "Write release notes",
                "description": "Cover the auth changes",
                "priority": "high",
                "tags": ["docs"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["title"], "Write release notes");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["user_id"], ctx.user.id.to_string());
    assert_eq!(task["tags"][0], "docs");
    let id = task["id"].as_str().unwrap().to_string();
    let uri = format!("/api/tasks/{}", id);

    // Read it back
    let (status, fetched) =
        common::send(&mut ctx.app, common::bare_request("GET", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id.as_str());

    // Full replace: omitted fields reset
    let (status, replaced) = common::send(
        &mut ctx.app,
        common::json_request(
            "PUT",
            &uri,
            Some(&token),
            &json!({ "title": "Write release notes v2", "status": "in_progress" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["title"], "Write release notes v2");
    assert_eq!(replaced["status"], "in_progress");
    assert_eq!(replaced["priority"], "medium");
    assert!(replaced["description"].is_null());
    assert_eq!(replaced["tags"].as_array().unwrap().len(), 0);

    // Partial update: untouched fields survive
    let (status, patched) = common::send(
        &mut ctx.app,
        common::json_request(
            "PATCH",
            &uri,
            Some(&token),
            &json!({ "description": "added back", "priority": "urgent" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Write release notes v2");
    assert_eq!(patched["description"], "added back");
    assert_eq!(patched["priority"], "urgent");

    // Explicit null clears a nullable field
    let (status, cleared) = common::send(
        &mut ctx.app,
        common::json_request("PATCH", &uri, Some(&token), &json!({ "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["description"].is_null());
    assert_eq!(cleared["priority"], "urgent");

    // Delete, then the id is gone
    let (status, body) =
        common::send(&mut ctx.app, common::bare_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) =
        common::send(&mut ctx.app, common::bare_request("GET", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "TASK_NOT_FOUND");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_ownership_isolation() {
    let mut ctx = TestContext::new().await.unwrap();
    let owner_token = ctx.jwt_token.clone();
    let (other, other_token) = ctx.other_user().await.unwrap();

    let (status, task) = common::send(
        &mut ctx.app,
        common::json_request(
            "POST",
            "/api/tasks",
            Some(&owner_token),
            &json!({ "title": "Private task" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/tasks/{}", task["id"].as_str().unwrap());

    // Another account sees 403 on an existing task...
    let (status, body) = common::send(
        &mut ctx.app,
        common::bare_request("GET", &uri, Some(&other_token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "TASK_NOT_AUTHORIZED");
    assert_eq!(body["message"], "Access denied");

    // ...for writes too
    let (status, _) = common::send(
        &mut ctx.app,
        common::bare_request("DELETE", &uri, Some(&other_token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // ...but 404 on an id that does not exist at all
    let ghost = format!("/api/tasks/{}", Uuid::new_v4());
    let (status, body) = common::send(
        &mut ctx.app,
        common::bare_request("GET", &ghost, Some(&other_token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "TASK_NOT_FOUND");

    // The owner's task survived the foreign delete attempt
    let (status, _) = common::send(
        &mut ctx.app,
        common::bare_request("GET", &uri, Some(&owner_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // And never appears in the other account's listing
    let (status, listing) = common::send(
        &mut ctx.app,
        common::bare_request("GET", "/api/tasks", Some(&other_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 0);

    delete_user_by_email(&ctx.db, &other.email).await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_list_pagination_filter_sort() {
    let mut ctx = TestContext::new().await.unwrap();
    let token = ctx.jwt_token.clone();

    for (title, priority, status) in [
        ("Alpha", "low", "pending"),
        ("Bravo", "high", "completed"),
        ("Charlie", "urgent", "pending"),
    ] {
        let (created, _) = common::send(
            &mut ctx.app,
            common::json_request(
                "POST",
                "/api/tasks",
                Some(&token),
                &json!({ "title": title, "priority": priority, "status": status }),
            ),
        )
        .await;
        assert_eq!(created, StatusCode::CREATED);
    }

    // Pagination: the window moves, the total does not
    let (status, page1) = common::send(
        &mut ctx.app,
        common::bare_request("GET", "/api/tasks?limit=2&sort=title", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1["total"], 3);
    assert_eq!(page1["page"], 1);
    assert_eq!(page1["limit"], 2);
    assert_eq!(page1["items"].as_array().unwrap().len(), 2);
    assert_eq!(page1["items"][0]["title"], "Alpha");
    assert_eq!(page1["items"][1]["title"], "Bravo");

    let (_, page2) = common::send(
        &mut ctx.app,
        common::bare_request("GET", "/api/tasks?limit=2&page=2&sort=title", Some(&token)),
    )
    .await;
    assert_eq!(page2["total"], 3);
    assert_eq!(page2["items"].as_array().unwrap().len(), 1);
    assert_eq!(page2["items"][0]["title"], "Charlie");

    // Status filter applies to the count as well
    let (_, pending) = common::send(
        &mut ctx.app,
        common::bare_request("GET", "/api/tasks?status=pending", Some(&token)),
    )
    .await;
    assert_eq!(pending["total"], 2);

    // Priority sorts by rank, not alphabetically
    let (_, by_priority) = common::send(
        &mut ctx.app,
        common::bare_request("GET", "/api/tasks?sort=priority:desc", Some(&token)),
    )
    .await;
    assert_eq!(by_priority["items"][0]["priority"], "urgent");
    assert_eq!(by_priority["items"][2]["priority"], "low");

    // Multi-key sort: status ascending, then priority descending within it
    let (_, multi) = common::send(
        &mut ctx.app,
        common::bare_request(
            "GET",
            "/api/tasks?sort=status,priority:desc",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(multi["items"][0]["title"], "Charlie");
    assert_eq!(multi["items"][1]["title"], "Alpha");
    assert_eq!(multi["items"][2]["title"], "Bravo");

    ctx.cleanup().await.unwrap();
}
