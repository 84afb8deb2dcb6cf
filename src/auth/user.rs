use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Brand,
    Manufacturer,
    FinancialInstitution,
    Creator,
    Designer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        use Role::*;
        match self {
            Brand => "brand",
            Manufacturer => "manufacturer",
            FinancialInstitution => "financial_institution",
            Creator => "creator",
            Designer => "designer",
            Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// What the API exposes about a user; never the hash.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

pub(crate) async fn find_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email=?")
        .bind(email)
        .fetch_optional(db_pool)
        .await?)
}

pub(crate) async fn find_by_id(db_pool: &SqlitePool, id: Uuid) -> AppResult<Option<User>> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?)
}

pub(crate) async fn insert(db_pool: &SqlitePool, user: &User) -> AppResult<()> {
    sqlx::query("INSERT INTO users (id,email,display_name,role,password_hash,created_at) VALUES (?,?,?,?,?,?)")
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(db_pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_snake_case_on_the_wire() {
        let json = serde_json::to_string(&Role::FinancialInstitution).unwrap();
        assert_eq!(json, "\"financial_institution\"");
        let role: Role = serde_json::from_str("\"designer\"").unwrap();
        assert_eq!(role, Role::Designer);
        assert_eq!(Role::FinancialInstitution.to_string(), "financial_institution");
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Role>("\"supplier\"").is_err());
    }
}
