use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{filter::Searchable, AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RfqStatus {
    Draft,
    Active,
    Reviewing,
    Awarded,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfqAction {
    Publish,
    BeginReview,
    Respond,
    Award,
    Close,
}

impl RfqStatus {
    pub fn as_str(&self) -> &'static str {
        use RfqStatus::*;
        match self {
            Draft => "draft",
            Active => "active",
            Reviewing => "reviewing",
            Awarded => "awarded",
            Closed => "closed",
        }
    }

    /// The status after `action`, or an invalid-transition error.
    /// `Respond` leaves an active RFQ active.
    pub fn apply(self, action: RfqAction) -> AppResult<RfqStatus> {
        use RfqAction::*;
        use RfqStatus::*;

        let next = match (self, action) {
            (Draft, Publish) => Some(Active),
            (Active, BeginReview) => Some(Reviewing),
            (Active, Respond) => Some(Active),
            (Active | Reviewing, Award) => Some(Awarded),
            (Closed, Close) => None,
            (_, Close) => Some(Closed),
            _ => None,
        };

        next.ok_or_else(|| AppError::InvalidTransition(format!("cannot {action} an rfq that is {self}")))
    }

    pub fn accepts_responses(&self) -> bool {
        self.apply(RfqAction::Respond).is_ok()
    }
}

impl fmt::Display for RfqStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RfqAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use RfqAction::*;
        f.write_str(match self {
            Publish => "publish",
            BeginReview => "review",
            Respond => "respond to",
            Award => "award",
            Close => "close",
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Rfq {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: RfqStatus,
    pub budget: Option<i64>,
    pub quantity: i64,
    pub timeline: Option<String>,
    pub requirements: Json<Map<String, Value>>,
    pub response_count: i64,
    pub awarded_response_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Searchable for Rfq {
    fn haystacks(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ResponseStatus {
    Submitted,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RfqResponse {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub manufacturer_id: Uuid,
    pub price: i64,
    pub lead_time_days: Option<i64>,
    pub message: String,
    pub status: ResponseStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RfqRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub budget: Option<i64>,
    pub quantity: i64,
    pub timeline: Option<String>,
    #[serde(default)]
    pub requirements: Map<String, Value>,
}

impl RfqRequest {
    pub fn validated(mut self) -> AppResult<Self> {
        self.title = self.title.trim().to_owned();
        if self.title.is_empty() {
            return Err(AppError::validation("title is required"));
        }
        if self.quantity <= 0 {
            return Err(AppError::validation("quantity must be positive"));
        }
        if matches!(self.budget, Some(budget) if budget < 0) {
            return Err(AppError::validation("budget cannot be negative"));
        }
        self.category = self.category.trim().to_owned();
        self.timeline = self.timeline.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty());
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    pub price: i64,
    pub lead_time_days: Option<i64>,
    #[serde(default)]
    pub message: String,
}

impl RespondRequest {
    pub fn validated(self) -> AppResult<Self> {
        if self.price < 0 {
            return Err(AppError::validation("price cannot be negative"));
        }
        if matches!(self.lead_time_days, Some(days) if days <= 0) {
            return Err(AppError::validation("lead_time_days must be positive"));
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct RfqQuery {
    pub q: Option<String>,
    pub status: Option<RfqStatus>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AwardRequest {
    pub response_id: Uuid,
}
