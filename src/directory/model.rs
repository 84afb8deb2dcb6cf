use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{filter::Searchable, AppError, AppResult};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub industry: String,
    pub location: String,
    pub website: Option<String>,
    pub verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Manufacturer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub industry: String,
    pub location: String,
    pub website: Option<String>,
    pub capabilities: Json<Vec<String>>,
    pub min_order_quantity: Option<i64>,
    pub verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Searchable for Brand {
    fn haystacks(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }
}

impl Searchable for Manufacturer {
    fn haystacks(&self) -> Vec<&str> {
        let mut hay = vec![self.name.as_str(), self.description.as_str()];
        hay.extend(self.capabilities.iter().map(String::as_str));
        hay
    }
}

/// Body for creating or replacing a profile. Manufacturer-only fields are ignored for brands.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    pub website: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub min_order_quantity: Option<i64>,
}

impl ProfileRequest {
    pub fn validated(mut self) -> AppResult<Self> {
        self.name = self.name.trim().to_owned();
        if self.name.is_empty() {
            return Err(AppError::validation("name is required"));
        }
        if matches!(self.min_order_quantity, Some(moq) if moq <= 0) {
            return Err(AppError::validation("min_order_quantity must be positive"));
        }
        self.industry = self.industry.trim().to_owned();
        self.location = self.location.trim().to_owned();
        self.capabilities = self
            .capabilities
            .into_iter()
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    pub q: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub verified: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq)]
pub struct RatingSummary {
    pub review_count: i64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ManufacturerDetail {
    #[serde(flatten)]
    pub manufacturer: Manufacturer,
    pub rating: RatingSummary,
}
