use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProjectStatus {
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        use ProjectStatus::*;
        match self {
            InProgress => "in_progress",
            OnHold => "on_hold",
            Completed => "completed",
            Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }

    pub fn move_to(self, next: ProjectStatus) -> AppResult<ProjectStatus> {
        use ProjectStatus::*;
        let allowed = match (self, next) {
            (InProgress, OnHold) | (OnHold, InProgress) => true,
            (InProgress | OnHold, Completed | Cancelled) => true,
            _ => false,
        };
        if allowed {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition(format!("project cannot go from {self} to {next}")))
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub response_id: Uuid,
    pub brand_id: Uuid,
    pub manufacturer_id: Uuid,
    pub title: String,
    pub agreed_price: i64,
    pub status: ProjectStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ProjectStatus,
}
