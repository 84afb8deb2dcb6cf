pub mod appresult;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod directory;
pub mod envelope;
pub mod extract;
pub mod filter;
pub mod messages;
pub mod projects;
pub mod reviews;
pub mod rfqs;
pub mod session;

use std::{ops::Deref, sync::Arc};

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use config::EnvConfig;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<EnvConfig>,
    pub tx: broadcast::Sender<messages::Message>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: EnvConfig) -> Self {
        let tx = broadcast::channel(config.message_channel_capacity).0;
        AppState {
            db_pool,
            config: Arc::new(config),
            tx,
        }
    }
}

/// The whole HTTP surface, session and CORS layers included.
pub fn app(app_state: AppState) -> anyhow::Result<Router> {
    let config = app_state.config.clone();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.session_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(config.session_idle_minutes)));

    let api = Router::new()
        .nest("/auth", auth::router())
        .nest("/brands", directory::brands_router())
        .nest("/manufacturers", directory::manufacturers_router())
        .nest("/rfqs", rfqs::router())
        .nest("/projects", projects::router())
        .nest("/reviews", reviews::router())
        .nest("/messages", messages::router())
        .nest("/resources", catalog::resources_router())
        .nest("/raw-materials", catalog::raw_materials_router());

    let mut app = Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = &config.cors_origin {
        let cors = CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true);
        app = app.layer(cors);
    }

    Ok(app)
}

async fn health() -> &'static str {
    "ok"
}

pub struct Markdown<T>(pub T);

impl<T> IntoResponse for Markdown<T>
where
    T: Deref<Target = str>
{
    fn into_response(self) -> axum::response::Response {
        use pulldown_cmark::{Event, Options, Parser};

        // raw html in the source is shown as text, never rendered
        let parser = Parser::new_ext(&self.0, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
            .map(|event| match event {
                Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
                _ => event,
            });

        let mut html_output = String::new();
        pulldown_cmark::html::push_html(&mut html_output, parser);
        Html(html_output).into_response()
    }
}
