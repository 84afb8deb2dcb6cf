use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::config::EnvConfig;

pub async fn connect(config: &EnvConfig) -> anyhow::Result<SqlitePool> {
    tracing::info!(url = %config.database_url, "connecting to database");

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await?;

    migrate(&db_pool).await?;
    Ok(db_pool)
}

/// One connection that never idles out, so a `sqlite::memory:` database lives as long as the pool.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&db_pool).await?;
    Ok(db_pool)
}

async fn migrate(db_pool: &SqlitePool) -> anyhow::Result<()> {
    tracing::info!("running migrations");
    sqlx::migrate!("./migrations").run(db_pool).await?;
    Ok(())
}
