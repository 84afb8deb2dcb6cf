use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AppError, AppResult};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub project_id: Uuid,
    pub brand_id: Uuid,
    pub manufacturer_id: Uuid,
    pub quality_rating: i64,
    pub communication_rating: i64,
    pub timeliness_rating: i64,
    pub value_rating: i64,
    pub overall_rating: f64,
    pub comment: String,
    pub reply: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub replied_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Ratings {
    pub quality: i64,
    pub communication: i64,
    pub timeliness: i64,
    pub value: i64,
}

impl Ratings {
    /// Every sub-rating has to sit in `MIN_RATING..=MAX_RATING`.
    pub fn validate(&self) -> AppResult<()> {
        let named = [
            ("quality", self.quality),
            ("communication", self.communication),
            ("timeliness", self.timeliness),
            ("value", self.value),
        ];
        for (name, rating) in named {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(AppError::validation(format!(
                    "{name} rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
                )));
            }
        }
        Ok(())
    }

    pub fn overall(&self) -> f64 {
        (self.quality + self.communication + self.timeliness + self.value) as f64 / 4.0
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub project_id: Uuid,
    pub ratings: Ratings,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub reply: String,
}
