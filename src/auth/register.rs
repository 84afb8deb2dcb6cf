use std::sync::Arc;

use axum::{debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    config::EnvConfig,
    envelope::{ApiResponse, ApiResult},
    extract::Json,
    session::{self, SessionUser},
    AppError, AppState,
};

use super::{generate_display_name, password, user, PublicUser, Role, User};

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    email: String,
    password: String,
    role: Role,
    display_name: Option<String>,
}

pub(crate) fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(AppError::validation("email is not valid"));
    }
    Ok(email)
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<EnvConfig>>,
    session: Session,
    Json(RegisterRequest { email, password, role, display_name }): Json<RegisterRequest>,
) -> ApiResult<PublicUser> {
    let email = normalize_email(&email)?;
    password::validate(&password)?;

    let role = if config.is_admin_email(&email) {
        Role::Admin
    } else if role == Role::Admin {
        return Err(AppError::Forbidden);
    } else {
        role
    };

    if user::find_by_email(&db_pool, &email).await?.is_some() {
        return Err(AppError::Conflict("email already registered".into()));
    }

    let display_name = display_name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(generate_display_name);

    let user = User {
        id: Uuid::now_v7(),
        email,
        display_name,
        role,
        password_hash: password::hash(password, config.bcrypt_cost).await?,
        created_at: OffsetDateTime::now_utc(),
    };
    user::insert(&db_pool, &user).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "registered user");
    session::store(&session, SessionUser { id: user.id, role: user.role }).await?;

    Ok(ApiResponse::Created(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "ada", "@example.com", "ada@localhost", "ada@.com"] {
            assert!(normalize_email(email).is_err(), "{email} should be rejected");
        }
    }
}
