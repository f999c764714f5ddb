/// Integration tests for the TaskNest API
///
/// Each test drives the real router against the database at DATABASE_URL.
/// The suite covers the authentication flow end to end and the ownership
/// rules for every resource kind, including the deliberate 404-vs-403
/// asymmetry between task-scoped and comment-id paths.
mod common;

use axum::http::StatusCode;
use common::{unique_email, TestContext};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_signup_login_profile_flow() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("flow");

    // Signup returns 201 with a usable token
    let (signup_token, user) = ctx.signup(&email, "password123", "A").await;
    assert_eq!(user["email"], email.to_lowercase());
    assert_eq!(user["name"], "A");

    let (status, profile) = ctx
        .request("GET", "/api/users/profile", Some(&signup_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], email.to_lowercase());

    // Login issues a second token that also works
    let (status, body) = ctx
        .request(
            "POST",
            "/api/users/login",
            None,
            Some(json!({"email": email, "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let login_token = body["token"].as_str().unwrap().to_string();

    let (status, profile) = ctx
        .request("GET", "/api/users/profile", Some(&login_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "A");

    // No header at all
    let (status, body) = ctx.request("GET", "/api/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["details"], "no token provided");

    ctx.delete_user_by_email(&email).await;
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("badpw");
    ctx.signup(&email, "password123", "B").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/api/users/login",
            None,
            Some(json!({"email": email, "password": "not-the-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.delete_user_by_email(&email).await;
}

#[tokio::test]
async fn test_duplicate_email_signup() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("dup");
    ctx.signup(&email, "password123", "First").await;

    let (status, body) = ctx
        .request(
            "POST",
            "/api/users/signup",
            None,
            Some(json!({"email": email, "password": "password123", "name": "Second"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");

    // No second identity was created
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = LOWER($1)")
            .bind(&email)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(count, 1);

    ctx.delete_user_by_email(&email).await;
}

#[tokio::test]
async fn test_signup_validation() {
    let ctx = TestContext::new().await.unwrap();

    // Bad email
    let (status, body) = ctx
        .request(
            "POST",
            "/api/users/signup",
            None,
            Some(json!({"email": "not-an-email", "password": "password123", "name": "X"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].is_array());

    // Short password
    let (status, body) = ctx
        .request(
            "POST",
            "/api/users/signup",
            None,
            Some(json!({"email": unique_email("short"), "password": "short", "name": "X"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // Empty name
    let (status, body) = ctx
        .request(
            "POST",
            "/api/users/signup",
            None,
            Some(json!({"email": unique_email("noname"), "password": "password123", "name": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("expired");
    let (_, user) = ctx.signup(&email, "password123", "E").await;
    let user_id = Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();

    // Correctly signed but already past expiry
    let expired_service = tasknest_shared::auth::jwt::TokenService::new(
        common::TEST_SECRET,
        chrono::Duration::hours(-2),
    );
    let expired_token = expired_service.issue(user_id).unwrap();

    let (status, body) = ctx
        .request("GET", "/api/users/profile", Some(&expired_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"], "invalid or expired token");

    ctx.delete_user_by_email(&email).await;
}

#[tokio::test]
async fn test_garbage_and_foreign_tokens_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .request("GET", "/api/users/profile", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid shape, wrong secret
    let foreign = tasknest_shared::auth::jwt::TokenService::new(
        "another-secret-that-is-32-bytes-long!!",
        chrono::Duration::hours(1),
    );
    let token = foreign.issue(Uuid::new_v4()).unwrap();

    let (status, body) = ctx
        .request("GET", "/api/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"], "invalid or expired token");
}

#[tokio::test]
async fn test_deleted_subject_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("ghost");
    let (token, _) = ctx.signup(&email, "password123", "Ghost").await;

    // Token is valid, but the account vanishes underneath it
    ctx.delete_user_by_email(&email).await;

    let (status, body) = ctx
        .request("GET", "/api/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"], "subject no longer exists");
}

#[tokio::test]
async fn test_update_profile() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("rename");
    let (token, _) = ctx.signup(&email, "password123", "Before").await;

    // Name only; the email is untouched
    let (status, body) = ctx
        .request(
            "PUT",
            "/api/users/profile",
            Some(&token),
            Some(json!({"name": "After"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "After");
    assert_eq!(body["email"], email.to_lowercase());

    // New email is lower-cased on the way in
    let new_email = unique_email("Renamed");
    let (status, body) = ctx
        .request(
            "PUT",
            "/api/users/profile",
            Some(&token),
            Some(json!({"email": new_email})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], new_email.to_lowercase());
    assert_eq!(body["name"], "After");

    // The change sticks
    let (status, profile) = ctx
        .request("GET", "/api/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], new_email.to_lowercase());

    // A malformed email never reaches the database
    let (status, body) = ctx
        .request(
            "PUT",
            "/api/users/profile",
            Some(&token),
            Some(json!({"email": "not-an-email"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    ctx.delete_user_by_email(&new_email).await;
}

#[tokio::test]
async fn test_change_password() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("rotate");
    let (token, _) = ctx.signup(&email, "password123", "R").await;

    // Wrong current password changes nothing
    let (status, _) = ctx
        .request(
            "PUT",
            "/api/users/password",
            Some(&token),
            Some(json!({"current_password": "guessed-wrong", "new_password": "fresh-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx
        .request(
            "PUT",
            "/api/users/password",
            Some(&token),
            Some(json!({"current_password": "password123", "new_password": "fresh-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "password updated");

    // Old password is dead, new one logs in
    let (status, _) = ctx
        .request(
            "POST",
            "/api/users/login",
            None,
            Some(json!({"email": email, "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request(
            "POST",
            "/api/users/login",
            None,
            Some(json!({"email": email, "password": "fresh-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    ctx.delete_user_by_email(&email).await;
}

#[tokio::test]
async fn test_change_password_without_password_credential() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("oauth-only");

    // An account created through GitHub login has no password hash
    let (user_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (email, name, github_id) VALUES (LOWER($1), $2, $3) RETURNING id",
    )
    .bind(&email)
    .bind("Octo")
    .bind(rand_github_id())
    .fetch_one(&ctx.db)
    .await
    .unwrap();

    let tokens = tasknest_shared::auth::jwt::TokenService::new(
        common::TEST_SECRET,
        chrono::Duration::hours(1),
    );
    let token = tokens.issue(user_id).unwrap();

    let (status, body) = ctx
        .request(
            "PUT",
            "/api/users/password",
            Some(&token),
            Some(json!({"current_password": "anything", "new_password": "fresh-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["details"], "account has no password credential");

    ctx.delete_user_by_email(&email).await;
}

fn rand_github_id() -> i64 {
    // Positive and unique enough for the github_id unique constraint
    (Uuid::new_v4().as_u128() % (i64::MAX as u128)) as i64
}

#[tokio::test]
async fn test_task_crud_roundtrip() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("taskcrud");
    let (token, _) = ctx.signup(&email, "password123", "T").await;

    let (status, created) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({"title": "write the report", "description": "by friday"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "write the report");
    assert_eq!(created["completed"], false);
    let task_id = created["id"].as_str().unwrap().to_string();

    // Immediate fetch returns the created fields plus generated id/timestamps
    let (status, fetched) = ctx
        .request("GET", &format!("/api/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, listed) = ctx.request("GET", "/api/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().iter().any(|t| t["id"] == task_id.as_str()));

    let (status, updated) = ctx
        .request(
            "PUT",
            &format!("/api/tasks/{}", task_id),
            Some(&token),
            Some(json!({"completed": true, "description": null})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert!(updated["description"].is_null());
    // Absent fields are untouched
    assert_eq!(updated["title"], "write the report");

    let (status, body) = ctx
        .request("DELETE", &format!("/api/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "task deleted");

    let (status, _) = ctx
        .request("GET", &format!("/api/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.delete_user_by_email(&email).await;
}

#[tokio::test]
async fn test_cross_owner_task_is_invisible() {
    let ctx = TestContext::new().await.unwrap();
    let email1 = unique_email("owner1");
    let email2 = unique_email("owner2");
    let (token1, _) = ctx.signup(&email1, "password123", "U1").await;
    let (token2, _) = ctx.signup(&email2, "password123", "U2").await;

    let (_, task) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token1),
            Some(json!({"title": "private"})),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // Never 403: someone else's task looks exactly like no task at all
    let (status, body) = ctx
        .request(
            "PUT",
            &format!("/api/tasks/{}", task_id),
            Some(&token2),
            Some(json!({"title": "hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = ctx
        .request("GET", &format!("/api/tasks/{}", task_id), Some(&token2), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request("DELETE", &format!("/api/tasks/{}", task_id), Some(&token2), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner still sees the untouched task
    let (status, task) = ctx
        .request("GET", &format!("/api/tasks/{}", task_id), Some(&token1), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "private");

    ctx.delete_user_by_email(&email1).await;
    ctx.delete_user_by_email(&email2).await;
}

#[tokio::test]
async fn test_category_name_unique_per_owner() {
    let ctx = TestContext::new().await.unwrap();
    let email1 = unique_email("cat1");
    let email2 = unique_email("cat2");
    let (token1, _) = ctx.signup(&email1, "password123", "C1").await;
    let (token2, _) = ctx.signup(&email2, "password123", "C2").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/api/categories",
            Some(&token1),
            Some(json!({"name": "Work"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Same owner, same name: conflict reported as 400
    let (status, body) = ctx
        .request(
            "POST",
            "/api/categories",
            Some(&token1),
            Some(json!({"name": "Work"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");

    // Uniqueness is per owner, not global
    let (status, _) = ctx
        .request(
            "POST",
            "/api/categories",
            Some(&token2),
            Some(json!({"name": "Work"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    ctx.delete_user_by_email(&email1).await;
    ctx.delete_user_by_email(&email2).await;
}

#[tokio::test]
async fn test_cross_owner_category_is_invisible() {
    let ctx = TestContext::new().await.unwrap();
    let email1 = unique_email("catown1");
    let email2 = unique_email("catown2");
    let (token1, _) = ctx.signup(&email1, "password123", "C1").await;
    let (token2, _) = ctx.signup(&email2, "password123", "C2").await;

    let (_, category) = ctx
        .request(
            "POST",
            "/api/categories",
            Some(&token1),
            Some(json!({"name": "Secrets"})),
        )
        .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/api/categories/{}", category_id),
            Some(&token2),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A task can't be filed under someone else's category either
    let (status, _) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token2),
            Some(json!({"title": "sneaky", "category_id": category_id})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.delete_user_by_email(&email1).await;
    ctx.delete_user_by_email(&email2).await;
}

#[tokio::test]
async fn test_comment_authorization_asymmetry() {
    let ctx = TestContext::new().await.unwrap();
    let email1 = unique_email("commenter");
    let email2 = unique_email("stranger");
    let (token1, _) = ctx.signup(&email1, "password123", "U1").await;
    let (token2, _) = ctx.signup(&email2, "password123", "U2").await;

    let (_, task) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token1),
            Some(json!({"title": "t1"})),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, comment) = ctx
        .request(
            "POST",
            "/api/comments",
            Some(&token1),
            Some(json!({"task_id": task_id, "body": "c1"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["id"].as_str().unwrap().to_string();

    // Comment-id path: exists but wrong author -> 403, visible on purpose
    let (status, body) = ctx
        .request(
            "DELETE",
            &format!("/api/comments/{}", comment_id),
            Some(&token2),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    // Task-scoped path: same stranger, same task -> plain 404
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/api/comments/task/{}", task_id),
            Some(&token2),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    // Nonexistent comment id -> 404, not 403
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/api/comments/{}", Uuid::new_v4()),
            Some(&token2),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The author can still update their comment
    let (status, updated) = ctx
        .request(
            "PUT",
            &format!("/api/comments/{}", comment_id),
            Some(&token1),
            Some(json!({"body": "edited"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["body"], "edited");

    ctx.delete_user_by_email(&email1).await;
    ctx.delete_user_by_email(&email2).await;
}

#[tokio::test]
async fn test_comment_on_unowned_task() {
    let ctx = TestContext::new().await.unwrap();
    let email1 = unique_email("taskowner");
    let email2 = unique_email("intruder");
    let (token1, _) = ctx.signup(&email1, "password123", "U1").await;
    let (token2, _) = ctx.signup(&email2, "password123", "U2").await;

    let (_, task) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token1),
            Some(json!({"title": "t1"})),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    // Creating a comment requires owning the referenced task
    let (status, _) = ctx
        .request(
            "POST",
            "/api/comments",
            Some(&token2),
            Some(json!({"task_id": task_id, "body": "drive-by"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.delete_user_by_email(&email1).await;
    ctx.delete_user_by_email(&email2).await;
}

#[tokio::test]
async fn test_account_deletion_cascades() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("cascade");
    let (token, user) = ctx.signup(&email, "password123", "Gone").await;
    let user_id = user["id"].as_str().unwrap().to_string();

    let (_, task) = ctx
        .request(
            "POST",
            "/api/tasks",
            Some(&token),
            Some(json!({"title": "orphan-to-be"})),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();
    ctx.request(
        "POST",
        "/api/comments",
        Some(&token),
        Some(json!({"task_id": task_id, "body": "c"})),
    )
    .await;

    let (status, body) = ctx
        .request("DELETE", "/api/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "account deleted");

    // Nothing owned survives the account
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE owner_id = $1::uuid")
            .bind(&user_id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(count, 0);

    // And the token is dead at the gate
    let (status, _) = ctx.request("GET", "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}
