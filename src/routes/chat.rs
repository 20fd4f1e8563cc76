//! Direct message route handlers
//!
//! One-to-one conversations between squad members.

use crate::auth::Claims;
use crate::error::{ApiResult, AppError};
use crate::models::{MessageResponse, SuccessResponse};
use crate::state::SharedState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i32,
    pub sender_id: i32,
    pub body: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub peer_id: i32,
    pub peer: String,
    pub messages: Vec<ChatMessage>,
}

fn message_from_row(row: &tokio_postgres::Row) -> ChatMessage {
    ChatMessage {
        id: row.get("id"),
        sender_id: row.get("sender_id"),
        body: row.get("body"),
        is_read: row.get("is_read"),
        sent_at: row.get("sent_at"),
    }
}

/// GET /api/messages/{peer_id}
///
/// Both directions of the conversation, oldest first. Opening it marks the
/// peer's messages to the caller as read.
pub async fn conversation(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(peer_id): Path<i32>,
) -> ApiResult<Json<SuccessResponse<ConversationResponse>>> {
    let peer = state
        .members
        .find_by_id(peer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    let client = state.db_pool.get().await?;

    client
        .execute(
            "UPDATE messages SET is_read = true
             WHERE sender_id = $1 AND recipient_id = $2 AND is_read = false",
            &[&peer_id, &claims.sub],
        )
        .await?;

    let rows = client
        .query(
            "SELECT id, sender_id, body, is_read, sent_at
             FROM messages
             WHERE (sender_id = $1 AND recipient_id = $2)
                OR (sender_id = $2 AND recipient_id = $1)
             ORDER BY sent_at ASC",
            &[&claims.sub, &peer_id],
        )
        .await?;

    Ok(Json(SuccessResponse::with_data(
        "Conversation fetched.",
        ConversationResponse {
            peer_id,
            peer: peer.username,
            messages: rows.iter().map(message_from_row).collect(),
        },
    )))
}

/// POST /api/messages/{peer_id}
pub async fn send_message(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(peer_id): Path<i32>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<ChatMessage>>), AppError> {
    let body = req.body.trim();
    if body.is_empty() {
        return Err(AppError::Validation("Message body is required".to_string()));
    }
    if peer_id == claims.sub {
        return Err(AppError::BadRequest("Cannot message yourself".to_string()));
    }

    let client = state.db_pool.get().await?;

    let row = client
        .query_one(
            "INSERT INTO messages (sender_id, recipient_id, body)
             VALUES ($1, $2, $3)
             RETURNING id, sender_id, body, is_read, sent_at",
            &[&claims.sub, &peer_id, &body],
        )
        .await
        .map_err(|e| {
            if crate::error::is_foreign_key_violation(&e) {
                AppError::NotFound("Member not found".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    debug!("Member {} messaged member {}", claims.sub, peer_id);

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Sent.", message_from_row(&row))),
    ))
}

/// DELETE /api/messages/{peer_id}/{message_id}
///
/// Scoped delete: only the sender can remove a message.
pub async fn delete_message(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path((_peer_id, message_id)): Path<(i32, i32)>,
) -> ApiResult<Json<MessageResponse>> {
    let client = state.db_pool.get().await?;

    let affected = client
        .execute(
            "DELETE FROM messages WHERE id = $1 AND sender_id = $2",
            &[&message_id, &claims.sub],
        )
        .await?;

    let message = if affected == 1 {
        "Message deleted."
    } else {
        "Nothing to delete."
    };

    Ok(Json(MessageResponse::new(message)))
}
