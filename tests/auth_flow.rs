use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{Account, TestContext, ADMIN_EMAIL};

#[tokio::test]
async fn test_register_then_login() {
    let ctx = TestContext::new().await;
    let account = ctx.register("Ada@Studio.test", "designer").await;

    let reply = ctx.get("/api/auth/me", &account).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["user"]["email"], "ada@studio.test");
    assert_eq!(reply.data()["user"]["role"], "designer");
    assert!(reply.data()["user"].get("password_hash").is_none());
    // no display name given, one is generated
    assert!(!reply.data()["user"]["display_name"].as_str().unwrap().is_empty());

    let reply = ctx
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@studio.test", "password": "correct horse" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.cookie.expect("login sets a session cookie");

    let fresh = Account { cookie, user_id: account.user_id.clone() };
    let reply = ctx.get("/api/auth/me", &fresh).await;
    assert_eq!(reply.data()["user"]["id"], account.user_id.as_str());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let ctx = TestContext::new().await;
    ctx.register("ada@studio.test", "designer").await;

    let reply = ctx
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@studio.test", "password": "battery staple" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let ctx = TestContext::new().await;
    ctx.register("ada@studio.test", "designer").await;

    let reply = ctx
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "ADA@studio.test", "password": "another one", "role": "creator" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_cannot_self_register() {
    let ctx = TestContext::new().await;

    let reply = ctx
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "mallory@evil.test", "password": "correct horse", "role": "admin" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // configured admin emails are promoted whatever role they ask for
    let admin = ctx.register(ADMIN_EMAIL, "creator").await;
    let reply = ctx.get("/api/auth/me", &admin).await;
    assert_eq!(reply.data()["user"]["role"], "admin");
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let ctx = TestContext::new().await;
    let reply = ctx
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "ada@studio.test", "password": "short", "role": "creator" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let ctx = TestContext::new().await;
    let account = ctx.register("ada@studio.test", "designer").await;

    let reply = ctx.post("/api/auth/logout", &account, json!({})).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let reply = ctx.get("/api/auth/me", &account).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let reply = ctx.call(Method::GET, "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "ok");
}

#[tokio::test]
async fn test_malformed_requests_get_error_bodies() {
    let ctx = TestContext::new().await;

    let reply = ctx
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "ada@studio.test", "password": "correct horse", "role": "supplier" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "VALIDATION_ERROR");
    assert!(reply.body["message"].as_str().unwrap().contains("supplier"));

    let account = ctx.register("ada@studio.test", "designer").await;

    let reply = ctx.get("/api/rfqs/not-a-uuid", &account).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "VALIDATION_ERROR");

    let reply = ctx.get("/api/messages?unread=maybe", &account).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "VALIDATION_ERROR");

    let reply = ctx.call(Method::POST, "/api/messages", Some(&account), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "VALIDATION_ERROR");
}
