//! Member accounts
//!
//! Database service for squad member records. Everything identity-related
//! (registration lookups, profile edits, account deletion) goes through here.

use crate::error::{is_unique_violation, AppError};
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::Serialize;

/// A squad member
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub hobbies: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Compact member shape for lists (chat partners, feed authors)
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: i32,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Profile fields a member can change about themselves
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub hobbies: Option<String>,
}

fn member_from_row(row: &tokio_postgres::Row) -> Member {
    Member {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        hobbies: row.get("hobbies"),
        bio: row.get("bio"),
        avatar_url: row.get("avatar_url"),
        created_at: row.get("created_at"),
    }
}

/// Member service for database operations
pub struct MemberService {
    pool: Pool,
}

impl MemberService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new member. A username collision maps to Conflict.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        hobbies: Option<&str>,
    ) -> Result<Member, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                "INSERT INTO members (username, password_hash, hobbies)
                 VALUES ($1, $2, $3)
                 RETURNING id, username, password_hash, hobbies, bio, avatar_url, created_at",
                &[&username, &password_hash, &hobbies],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Username already taken".to_string())
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(member_from_row(&row))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Member>, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_opt(
                "SELECT id, username, password_hash, hobbies, bio, avatar_url, created_at
                 FROM members WHERE username = $1",
                &[&username],
            )
            .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Member>, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_opt(
                "SELECT id, username, password_hash, hobbies, bio, avatar_url, created_at
                 FROM members WHERE id = $1",
                &[&id],
            )
            .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// List every member except the caller (the chat/member sidebar)
    pub async fn list_others(&self, member_id: i32) -> Result<Vec<MemberSummary>, AppError> {
        let client = self.pool.get().await?;

        let rows = client
            .query(
                "SELECT id, username, avatar_url FROM members
                 WHERE id != $1 ORDER BY username ASC",
                &[&member_id],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|r| MemberSummary {
                id: r.get("id"),
                username: r.get("username"),
                avatar_url: r.get("avatar_url"),
            })
            .collect())
    }

    /// Current membership size, the N in the quorum ratio
    pub async fn count(&self) -> Result<i64, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_one("SELECT COUNT(*) FROM members", &[]).await?;
        Ok(row.get(0))
    }

    /// Apply profile edits; absent fields keep their current value
    pub async fn update_profile(
        &self,
        member_id: i32,
        update: ProfileUpdate,
    ) -> Result<Member, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_opt(
                "UPDATE members SET
                    bio = COALESCE($1, bio),
                    avatar_url = COALESCE($2, avatar_url),
                    hobbies = COALESCE($3, hobbies)
                 WHERE id = $4
                 RETURNING id, username, password_hash, hobbies, bio, avatar_url, created_at",
                &[&update.bio, &update.avatar_url, &update.hobbies, &member_id],
            )
            .await?;

        row.as_ref()
            .map(member_from_row)
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))
    }

    /// Delete a member account.
    ///
    /// Owned posts, messages, events, votes and notifications cascade away;
    /// ledger entries are kept with a NULL member so the pooled balance
    /// does not move.
    pub async fn delete(&self, member_id: i32) -> Result<(), AppError> {
        let client = self.pool.get().await?;

        let affected = client
            .execute("DELETE FROM members WHERE id = $1", &[&member_id])
            .await?;

        if affected == 0 {
            return Err(AppError::NotFound("Member not found".to_string()));
        }
        Ok(())
    }
}
