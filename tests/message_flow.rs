use std::time::Duration;

use axum::http::StatusCode;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::{
    client::IntoClientRequest,
    http::{header, HeaderValue},
    Message as Frame,
};

mod common;
use common::TestContext;

#[tokio::test]
async fn test_send_and_read_message() {
    let ctx = TestContext::new().await;
    let (brand, _) = ctx.brand("buyer@totes.test").await;
    let (maker, _) = ctx.manufacturer("maker@mill.test", "Mill").await;

    let reply = ctx
        .post("/api/messages", &brand, json!({ "recipient_id": maker.user_id, "body": "  can you do 12oz canvas?  " }))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.data()["body"], "can you do 12oz canvas?");
    let message_id = reply.id();

    let reply = ctx.get("/api/messages/unread", &maker).await;
    assert_eq!(reply.data()["unread"], 1);

    let reply = ctx.get("/api/messages?unread=true", &maker).await;
    assert_eq!(reply.data().as_array().unwrap().len(), 1);

    // only the recipient marks a message read
    let reply = ctx.post(&format!("/api/messages/{message_id}/read"), &brand, json!({})).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = ctx.post(&format!("/api/messages/{message_id}/read"), &maker, json!({})).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.data()["read_at"].is_string());

    let reply = ctx.get("/api/messages/unread", &maker).await;
    assert_eq!(reply.data()["unread"], 0);
    let reply = ctx.get("/api/messages?unread=true", &maker).await;
    assert!(reply.data().as_array().unwrap().is_empty());
    let reply = ctx.get("/api/messages", &maker).await;
    assert_eq!(reply.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_conversation_is_private_to_its_parties() {
    let ctx = TestContext::new().await;
    let (brand, _) = ctx.brand("buyer@totes.test").await;
    let (maker, _) = ctx.manufacturer("maker@mill.test", "Mill").await;
    let outsider = ctx.register("fi@bank.test", "financial_institution").await;

    ctx.post("/api/messages", &brand, json!({ "recipient_id": maker.user_id, "body": "hello" })).await;
    let reply = ctx.post("/api/messages", &maker, json!({ "recipient_id": brand.user_id, "body": "hi back" })).await;
    let reply_id = reply.id();

    let reply = ctx.get(&format!("/api/messages/with/{}", maker.user_id), &brand).await;
    let bodies: Vec<&str> = reply.data().as_array().unwrap().iter().map(|m| m["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["hello", "hi back"]);

    let reply = ctx.get(&format!("/api/messages/with/{}", maker.user_id), &outsider).await;
    assert!(reply.data().as_array().unwrap().is_empty());

    let reply = ctx.post(&format!("/api/messages/{reply_id}/read"), &outsider, json!({})).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_messages_are_rejected() {
    let ctx = TestContext::new().await;
    let (brand, _) = ctx.brand("buyer@totes.test").await;

    let reply = ctx.post("/api/messages", &brand, json!({ "recipient_id": brand.user_id, "body": "me" })).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = ctx
        .post("/api/messages", &brand, json!({ "recipient_id": uuid::Uuid::now_v7(), "body": "anyone?" }))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let maker = ctx.register("maker@mill.test", "manufacturer").await;
    let reply = ctx.post("/api/messages", &brand, json!({ "recipient_id": maker.user_id, "body": "   " })).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_socket_relays_messages() {
    let ctx = TestContext::new().await;
    let (brand, _) = ctx.brand("buyer@totes.test").await;
    let (maker, _) = ctx.manufacturer("maker@mill.test", "Mill").await;
    let rival = ctx.register("rival@mill.test", "manufacturer").await;
    let addr = ctx.serve().await;
    let url = format!("ws://{addr}/api/messages/ws");

    assert!(tokio_tungstenite::connect_async(url.as_str()).await.is_err(), "socket needs a session");

    let mut request = url.as_str().into_client_request().unwrap();
    request.headers_mut().insert(header::COOKIE, HeaderValue::from_str(&maker.cookie).unwrap());
    let (mut socket, _) = tokio_tungstenite::connect_async(request).await.expect("socket upgrade");

    // json frames from the socket are sent as messages
    let frame = json!({ "recipient_id": brand.user_id, "body": "sent over the socket" }).to_string();
    socket.send(Frame::Text(frame.into())).await.unwrap();

    let mut delivered = false;
    for _ in 0..100 {
        let reply = ctx.get("/api/messages", &brand).await;
        if reply.data().as_array().unwrap().iter().any(|m| m["body"] == "sent over the socket") {
            delivered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(delivered);

    // the maker's own outgoing message and the rival's message are not pushed to the maker
    ctx.post("/api/messages", &brand, json!({ "recipient_id": rival.user_id, "body": "for the rival" })).await;
    ctx.post("/api/messages", &brand, json!({ "recipient_id": maker.user_id, "body": "for the mill" })).await;

    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("message pushed in time")
        .expect("socket still open")
        .expect("readable frame");
    let pushed: Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();
    assert_eq!(pushed["body"], "for the mill");
    assert_eq!(pushed["sender_id"], brand.user_id.as_str());
    assert_eq!(pushed["recipient_id"], maker.user_id.as_str());
}
