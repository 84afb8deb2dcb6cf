use std::str::FromStr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct EnvConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub session_secure: bool,
    pub session_idle_minutes: i64,
    pub cors_origin: Option<String>,
    pub bcrypt_cost: u32,
    pub admin_emails: Vec<String>,
    pub message_channel_capacity: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            bind_addr: "0.0.0.0:8080".to_owned(),
            database_url: "sqlite://foundry.db?mode=rwc".to_owned(),
            db_max_connections: 16,
            session_secure: false,
            session_idle_minutes: 60,
            cors_origin: None,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            admin_emails: Vec::new(),
            message_channel_capacity: 64,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = EnvConfig::default();

        fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
        where
            T: FromStr,
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            match lookup(key) {
                Some(raw) => raw.trim().parse().with_context(|| format!("invalid {key}: {raw:?}")),
                None => Ok(default),
            }
        }

        let admin_emails = lookup("ADMIN_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(|email| email.trim().to_lowercase())
                    .filter(|email| !email.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let config = EnvConfig {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            session_secure: parsed(&lookup, "SESSION_SECURE", defaults.session_secure)?,
            session_idle_minutes: parsed(&lookup, "SESSION_IDLE_MINUTES", defaults.session_idle_minutes)?,
            cors_origin: lookup("CORS_ORIGIN").filter(|origin| !origin.is_empty()),
            bcrypt_cost: parsed(&lookup, "BCRYPT_COST", defaults.bcrypt_cost)?,
            admin_emails,
            message_channel_capacity: parsed(&lookup, "MESSAGE_CHANNEL_CAPACITY", defaults.message_channel_capacity)?,
        };

        if config.message_channel_capacity == 0 {
            anyhow::bail!("MESSAGE_CHANNEL_CAPACITY must be positive");
        }

        Ok(config)
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|admin| admin == email)
    }
}
