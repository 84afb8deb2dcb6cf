#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use foundry::{app, db, AppState, EnvConfig};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@foundry.test";

pub struct TestContext {
    pub app: Router,
    pub db_pool: SqlitePool,
}

/// A signed-in user: the session cookie plus the ids the API handed back.
#[derive(Clone, Debug)]
pub struct Account {
    pub cookie: String,
    pub user_id: String,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<String>,
}

impl Reply {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn id(&self) -> String {
        self.body["data"]["id"].as_str().expect("response carries an id").to_owned()
    }
}

impl TestContext {
    pub async fn new() -> TestContext {
        let config = EnvConfig {
            bcrypt_cost: 4,
            admin_emails: vec![ADMIN_EMAIL.to_owned()],
            ..EnvConfig::default()
        };

        let db_pool = db::connect_in_memory().await.expect("Failed to open in-memory database");
        let app = app(AppState::new(db_pool.clone(), config)).expect("Failed to build app");

        TestContext { app, db_pool }
    }

    /// Serves the app on a local port, for clients that need a real connection.
    pub async fn serve(&self) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = self.app.clone();
        tokio::spawn(async move { axum::serve(listener, app).await });
        addr
    }

    pub async fn call(&self, method: Method, uri: &str, account: Option<&Account>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(account) = account {
            builder = builder.header(header::COOKIE, &account.cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.app.clone().oneshot(request).await.expect("router is infallible");

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Reply { status, body, cookie }
    }

    pub async fn get(&self, uri: &str, account: &Account) -> Reply {
        self.call(Method::GET, uri, Some(account), None).await
    }

    pub async fn post(&self, uri: &str, account: &Account, body: Value) -> Reply {
        self.call(Method::POST, uri, Some(account), Some(body)).await
    }

    pub async fn put(&self, uri: &str, account: &Account, body: Value) -> Reply {
        self.call(Method::PUT, uri, Some(account), Some(body)).await
    }

    pub async fn register(&self, email: &str, role: &str) -> Account {
        let reply = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": "correct horse", "role": role })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "register {email}: {:?}", reply.body);

        Account {
            cookie: reply.cookie.clone().expect("register sets a session cookie"),
            user_id: reply.id(),
        }
    }

    /// A brand user with a brand profile. Returns the account and the brand id.
    pub async fn brand(&self, email: &str) -> (Account, String) {
        let account = self.register(email, "brand").await;
        let reply = self
            .post("/api/brands", &account, test_data::profile("Tote Co", "bags"))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
        let brand_id = reply.id();
        (account, brand_id)
    }

    /// A manufacturer user with a manufacturer profile. Returns the account and the manufacturer id.
    pub async fn manufacturer(&self, email: &str, name: &str) -> (Account, String) {
        let account = self.register(email, "manufacturer").await;
        let reply = self
            .post("/api/manufacturers", &account, test_data::profile(name, "bags"))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
        let manufacturer_id = reply.id();
        (account, manufacturer_id)
    }

    /// A draft RFQ owned by `brand`, already published when `publish` is set.
    pub async fn rfq(&self, brand: &Account, publish: bool) -> String {
        let reply = self.post("/api/rfqs", brand, test_data::rfq("500 canvas totes")).await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
        let rfq_id = reply.id();

        if publish {
            let reply = self.post(&format!("/api/rfqs/{rfq_id}/publish"), brand, json!({})).await;
            assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
        }
        rfq_id
    }

    pub async fn respond(&self, rfq_id: &str, manufacturer: &Account, price: i64) -> Reply {
        self.post(
            &format!("/api/rfqs/{rfq_id}/responses"),
            manufacturer,
            json!({ "price": price, "lead_time_days": 21, "message": "we can do this" }),
        )
        .await
    }

    pub async fn project_count(&self, rfq_id: &str) -> i64 {
        let rfq_id: uuid::Uuid = rfq_id.parse().expect("uuid");
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE rfq_id=?")
            .bind(rfq_id)
            .fetch_one(&self.db_pool)
            .await
            .expect("count projects");
        count
    }
}

pub mod test_data {
    use serde_json::{json, Value};

    pub fn profile(name: &str, industry: &str) -> Value {
        json!({
            "name": name,
            "description": format!("{name} makes things"),
            "industry": industry,
            "location": "Porto",
            "capabilities": ["screen printing", "cut and sew"],
        })
    }

    pub fn rfq(title: &str) -> Value {
        json!({
            "title": title,
            "description": "heavy canvas, natural color",
            "category": "bags",
            "budget": 2500,
            "quantity": 500,
            "timeline": "2026-12-01",
            "requirements": { "material": "12oz canvas", "print": "one color" },
        })
    }
}
