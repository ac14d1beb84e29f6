//! Admin endpoints: directory management, password resets, historical
//! imports and clearing a year.

use axum::http::StatusCode;
use serde_json::json;

use maison_integration_tests::{TestContext, test_password};

#[tokio::test]
async fn test_admin_routes_reject_plain_users() {
    let ctx = TestContext::new().await;
    let session = ctx.claim_account("me").await;

    let (status, _) = ctx.get("/admin/users", &session).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .post("/admin/clear/2026", &session, json!({"confirmed": true}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_users_returns_roster() {
    let ctx = TestContext::new().await;
    let admin = ctx.claim_account("admin").await;

    let (status, body) = ctx.get("/admin/users", &admin).await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 5);
    assert!(users.iter().any(|u| u["key"] == "admin" && u["role"] == "admin"));
}

#[tokio::test]
async fn test_create_update_delete_user() {
    let ctx = TestContext::new().await;
    let admin = ctx.claim_account("admin").await;

    let (status, body) = ctx
        .post(
            "/admin/users",
            &admin,
            json!({"user": "cousin", "name": "Cousin"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "cousin");
    assert_eq!(body["role"], "user");
    // Palette color assigned automatically.
    assert!(body["color"].as_str().unwrap().starts_with('#'));

    let (status, body) = ctx
        .patch(
            "/admin/users/cousin",
            &admin,
            json!({"name": "The Cousin", "role": "admin", "color": "#FFD700"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "The Cousin");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["color"], "#FFD700");

    let (status, _) = ctx.delete("/admin/users/cousin", &admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.get("/admin/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().iter().any(|u| u["key"] == "cousin"));
}

#[tokio::test]
async fn test_create_rejects_duplicate_key() {
    let ctx = TestContext::new().await;
    let admin = ctx.claim_account("admin").await;

    let (status, _) = ctx
        .post("/admin/users", &admin, json!({"user": "me", "name": "Me Again"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reset_reopens_signup() {
    let ctx = TestContext::new().await;
    let admin = ctx.claim_account("admin").await;
    ctx.claim_account("me").await;

    let (status, _) = ctx
        .post("/admin/users/me/reset", &admin, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works, and the account can be claimed anew.
    let (status, _) = ctx
        .post_anonymous("/auth/login", json!({"user": "me", "password": test_password()}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .post_anonymous("/auth/signup", json!({"user": "me", "password": "a-brand-new-one"}))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_import_history() {
    let ctx = TestContext::new().await;
    let admin = ctx.claim_account("admin").await;

    let (status, body) = ctx
        .post(
            "/admin/import/2024",
            &admin,
            json!({"confirmed": true, "ranges": [
                {"start": "2024-07-01", "end": "2024-07-03", "user": "me"},
                {"start": "2024-08-10", "end": "2024-08-10", "user": "brother"},
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booked"], 4);

    let (status, body) = ctx.get("/bookings/2024", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["2024-07-02"][0]["user"], "me");
    assert_eq!(body["2024-08-10"][0]["user"], "brother");
}

#[tokio::test]
async fn test_import_requires_confirmation() {
    let ctx = TestContext::new().await;
    let admin = ctx.claim_account("admin").await;

    let (status, _) = ctx
        .post(
            "/admin/import/2024",
            &admin,
            json!({"ranges": [
                {"start": "2024-07-01", "end": "2024-07-01", "user": "me"},
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_import_rejects_range_outside_year() {
    let ctx = TestContext::new().await;
    let admin = ctx.claim_account("admin").await;

    let (status, _) = ctx
        .post(
            "/admin/import/2024",
            &admin,
            json!({"confirmed": true, "ranges": [
                {"start": "2024-12-30", "end": "2025-01-02", "user": "me"},
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A failed import leaves the year untouched.
    let (_, body) = ctx.get("/bookings/2024", &admin).await;
    assert!(body.as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_year_requires_confirmation() {
    let ctx = TestContext::new().await;
    let admin = ctx.claim_account("admin").await;

    ctx.post("/bookings/2026/toggle", &admin, json!({"date": "2026-07-15"}))
        .await;

    let (status, _) = ctx
        .post("/admin/clear/2026", &admin, json!({"confirmed": false}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = ctx
        .post("/admin/clear/2026", &admin, json!({"confirmed": true}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared_dates"], 1);

    let (_, body) = ctx.get("/bookings/2026", &admin).await;
    assert!(body.as_object().unwrap().is_empty());
}
