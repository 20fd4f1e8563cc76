//! Notification inbox
//!
//! Per-member notification rows plus the unread counters the client polls.
//! Events fan out one row per other member; fine at squad scale.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use serde::Serialize;

/// Notification kinds, used to mark a slice of the inbox read when the
/// member visits the matching page
pub const KIND_EVENT: &str = "event";
pub const KIND_MONEY_REQUEST: &str = "money_request";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i32,
    pub body: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Unread counters shown as badges in the client
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCounts {
    pub messages: i64,
    pub notifications: i64,
}

/// Notification service for database operations
pub struct NotificationService {
    pool: Pool,
}

impl NotificationService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Insert one notification for every member except the sender
    pub async fn fan_out_to_others(
        &self,
        sender_id: i32,
        kind: &str,
        body: &str,
    ) -> Result<u64, AppError> {
        let client = self.pool.get().await?;

        let inserted = client
            .execute(
                "INSERT INTO notifications (member_id, body, kind)
                 SELECT id, $2, $3 FROM members WHERE id != $1",
                &[&sender_id, &body, &kind],
            )
            .await?;

        Ok(inserted)
    }

    /// A member's notifications, newest first
    pub async fn list(&self, member_id: i32) -> Result<Vec<Notification>, AppError> {
        let client = self.pool.get().await?;

        let rows = client
            .query(
                "SELECT id, body, kind, is_read, created_at
                 FROM notifications WHERE member_id = $1 ORDER BY id DESC",
                &[&member_id],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|r| Notification {
                id: r.get("id"),
                body: r.get("body"),
                kind: r.get("kind"),
                is_read: r.get("is_read"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    /// Mark a member's notifications of one kind as read
    pub async fn mark_read(&self, member_id: i32, kind: &str) -> Result<(), AppError> {
        let client = self.pool.get().await?;

        client
            .execute(
                "UPDATE notifications SET is_read = true
                 WHERE member_id = $1 AND kind = $2 AND is_read = false",
                &[&member_id, &kind],
            )
            .await?;

        Ok(())
    }

    /// Unread message and notification counts for the badges
    pub async fn unread_counts(&self, member_id: i32) -> Result<UnreadCounts, AppError> {
        let client = self.pool.get().await?;

        let row = client
            .query_one(
                "SELECT
                    (SELECT COUNT(*) FROM messages
                     WHERE recipient_id = $1 AND is_read = false) AS messages,
                    (SELECT COUNT(*) FROM notifications
                     WHERE member_id = $1 AND is_read = false) AS notifications",
                &[&member_id],
            )
            .await?;

        Ok(UnreadCounts {
            messages: row.get("messages"),
            notifications: row.get("notifications"),
        })
    }
}
