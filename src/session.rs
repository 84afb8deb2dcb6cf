use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{auth::Role, AppError};

pub const USER_ID: &str = "user_id";
pub const ROLE: &str = "role";

/// The authenticated caller, read from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub role: Role,
}

impl SessionUser {
    /// Inline allow-list check. Anyone outside `allowed` gets the fixed forbidden error.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.id, role = %self.role, "role not allowed");
            Err(AppError::Forbidden)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub async fn store(session: &Session, user: SessionUser) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;
    session.insert(ROLE, user.role).await?;
    Ok(())
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;

        let Some(id) = session.get::<Uuid>(USER_ID).await? else {
            return Err(AppError::Unauthorized);
        };
        let Some(role) = session.get::<Role>(ROLE).await? else {
            return Err(AppError::Unauthorized);
        };

        Ok(SessionUser { id, role })
    }
}
