use foundry::{app, db, AppState, EnvConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EnvConfig::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("foundry=info,tower_http=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::connect(&config).await?;
    let bind_addr = config.bind_addr.clone();

    let app = app(AppState::new(db_pool, config))?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
