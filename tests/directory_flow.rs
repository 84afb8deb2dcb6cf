use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{test_data, TestContext, ADMIN_EMAIL};

fn names(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn test_profiles_are_one_per_user() {
    let ctx = TestContext::new().await;
    let (brand, _) = ctx.brand("buyer@totes.test").await;

    let reply = ctx.post("/api/brands", &brand, test_data::profile("Second Co", "bags")).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);

    // role decides which profile kind a user may own
    let reply = ctx.post("/api/manufacturers", &brand, test_data::profile("Nope", "bags")).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_me_reports_profile() {
    let ctx = TestContext::new().await;
    let (maker, manufacturer_id) = ctx.manufacturer("maker@mill.test", "Mill").await;

    let reply = ctx.get("/api/auth/me", &maker).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["user"]["role"], "manufacturer");
    assert_eq!(reply.data()["manufacturer_id"], manufacturer_id.as_str());
    assert!(reply.data()["brand_id"].is_null());
}

#[tokio::test]
async fn test_manufacturer_search_and_filters() {
    let ctx = TestContext::new().await;
    let (first, _) = ctx.manufacturer("one@mill.test", "Northwind Metals").await;
    let (second, _) = ctx.manufacturer("two@mill.test", "Blue Loom").await;
    ctx.manufacturer("three@mill.test", "Acme Textiles").await;

    let me = ctx.get("/api/auth/me", &first).await;
    let first_id = me.data()["manufacturer_id"].as_str().unwrap().to_owned();
    let reply = ctx
        .put(
            &format!("/api/manufacturers/{first_id}"),
            &first,
            json!({ "name": "Northwind Metals", "industry": "metal", "location": "Lyon", "capabilities": ["CNC machining"] }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = ctx.get("/api/manufacturers?q=loom", &second).await;
    assert_eq!(names(&reply.body), vec!["Blue Loom"]);

    let reply = ctx.get("/api/manufacturers?q=cnc", &second).await;
    assert_eq!(names(&reply.body), vec!["Northwind Metals"]);

    let reply = ctx.get("/api/manufacturers?industry=bags", &second).await;
    assert_eq!(names(&reply.body), vec!["Acme Textiles", "Blue Loom"]);

    let reply = ctx.get("/api/manufacturers?location=Lyon", &second).await;
    assert_eq!(names(&reply.body), vec!["Northwind Metals"]);

    let reply = ctx.get("/api/manufacturers?industry=bags&q=acme", &second).await;
    assert_eq!(names(&reply.body), vec!["Acme Textiles"]);
}

#[tokio::test]
async fn test_only_owner_updates_profile() {
    let ctx = TestContext::new().await;
    let (_, manufacturer_id) = ctx.manufacturer("one@mill.test", "Mill One").await;
    let (other, _) = ctx.manufacturer("two@mill.test", "Mill Two").await;

    let reply = ctx
        .put(&format!("/api/manufacturers/{manufacturer_id}"), &other, test_data::profile("Hijacked", "bags"))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_verification_is_admin_only() {
    let ctx = TestContext::new().await;
    let (maker, manufacturer_id) = ctx.manufacturer("maker@mill.test", "Mill").await;
    let admin = ctx.register(ADMIN_EMAIL, "creator").await;

    let uri = format!("/api/manufacturers/{manufacturer_id}/verification");
    let reply = ctx.post(&uri, &maker, json!({ "verified": true })).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = ctx.post(&uri, &admin, json!({ "verified": true })).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["verified"], true);

    let reply = ctx.get("/api/manufacturers?verified=true", &maker).await;
    assert_eq!(names(&reply.body), vec!["Mill"]);
    let reply = ctx.get("/api/manufacturers?verified=false", &maker).await;
    assert!(names(&reply.body).is_empty());
}

#[tokio::test]
async fn test_brand_verification() {
    let ctx = TestContext::new().await;
    let (brand, brand_id) = ctx.brand("buyer@totes.test").await;
    let admin = ctx.register(ADMIN_EMAIL, "creator").await;

    let uri = format!("/api/brands/{brand_id}/verification");
    let reply = ctx.post(&uri, &brand, json!({ "verified": true })).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = ctx.post(&uri, &admin, json!({ "verified": true })).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["verified"], true);

    let reply = ctx.get("/api/brands?verified=true", &brand).await;
    assert_eq!(names(&reply.body), vec!["Tote Co"]);

    let reply = ctx
        .post(&format!("/api/brands/{}/verification", uuid::Uuid::now_v7()), &admin, json!({ "verified": true }))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_brand_directory() {
    let ctx = TestContext::new().await;
    let (brand, brand_id) = ctx.brand("buyer@totes.test").await;

    let reply = ctx.get(&format!("/api/brands/{brand_id}"), &brand).await;
    assert_eq!(reply.data()["name"], "Tote Co");
    assert_eq!(reply.data()["verified"], false);

    let reply = ctx.get("/api/brands?q=tote", &brand).await;
    assert_eq!(names(&reply.body), vec!["Tote Co"]);
    let reply = ctx.get("/api/brands?industry=ceramics", &brand).await;
    assert!(names(&reply.body).is_empty());
}
