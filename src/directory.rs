//! Account directory lookups consumed by the messaging core.
//!
//! The messaging code treats these as opaque: an identity goes in, display
//! info comes out. Account management itself (rosters, guardian links,
//! credential issuance) lives outside this service.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Teacher,
    Admin,
}

impl Role {
    /// Only parents and teachers exchange messages.
    pub fn is_participant(self) -> bool {
        matches!(self, Role::Parent | Role::Teacher)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Role::Parent),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(ApiError::Internal(anyhow!("unknown role {other:?}"))),
        }
    }
}

/// Minimal display info attached to messages for both sender and recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub username: String,
    pub role: Role,
}

/// A full directory row, needed by the auth collaborator.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub display_name: String,
}

pub async fn party(pool: &SqlitePool, id: &str) -> ApiResult<Party> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT username,role FROM users WHERE id=?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    let Some((username, role)) = row else {
        return Err(ApiError::not_found(format!("user {id} not found")));
    };

    Ok(Party {
        id: id.to_owned(),
        username,
        role: role.parse()?,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> ApiResult<Option<UserRecord>> {
    let row: Option<(String, String, String, String)> = sqlx::query_as(
        "SELECT username,password_hash,role,display_name FROM users WHERE id=?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((username, password_hash, role, display_name)) => Ok(Some(UserRecord {
            id: id.to_owned(),
            username,
            password_hash,
            role: role.parse()?,
            display_name,
        })),
        None => Ok(None),
    }
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> ApiResult<Option<UserRecord>> {
    let row: Option<(String, String, String, String)> = sqlx::query_as(
        "SELECT id,password_hash,role,display_name FROM users WHERE username=?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id, password_hash, role, display_name)) => Ok(Some(UserRecord {
            id,
            username: username.to_owned(),
            password_hash,
            role: role.parse()?,
            display_name,
        })),
        None => Ok(None),
    }
}

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: Role,
    display_name: &str,
) -> ApiResult<String> {
    let id = Uuid::now_v7();

    sqlx::query("INSERT INTO users (id,username,password_hash,role,display_name) VALUES (?,?,?,?,?)")
        .bind(id.to_string())
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(display_name)
        .execute(pool)
        .await?;

    Ok(id.to_string())
}
