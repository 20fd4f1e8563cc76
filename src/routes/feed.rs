//! Shared feed route handlers
//!
//! The squad-wide post feed: list, create, and owner-scoped delete.

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
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub author: String,
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn post_from_row(row: &tokio_postgres::Row) -> Post {
    Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        author: row.get("author"),
        author_avatar_url: row.get("author_avatar_url"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
    }
}

/// GET /api/feed
///
/// All posts, newest first, with author details.
pub async fn feed(
    State(state): State<SharedState>,
    Extension(_claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse<Vec<Post>>>> {
    let client = state.db_pool.get().await?;

    let rows = client
        .query(
            "SELECT p.id, p.author_id, p.content, p.image_url, p.created_at,
                    m.username AS author, m.avatar_url AS author_avatar_url
             FROM posts p
             JOIN members m ON m.id = p.author_id
             ORDER BY p.id DESC",
            &[],
        )
        .await?;

    let posts: Vec<Post> = rows.iter().map(post_from_row).collect();

    Ok(Json(SuccessResponse::with_data("Feed fetched.", posts)))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<Post>>), AppError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Post content is required".to_string()));
    }

    let client = state.db_pool.get().await?;

    let row = client
        .query_one(
            "WITH inserted AS (
                INSERT INTO posts (author_id, content, image_url)
                VALUES ($1, $2, $3)
                RETURNING id, author_id, content, image_url, created_at
             )
             SELECT i.id, i.author_id, i.content, i.image_url, i.created_at,
                    m.username AS author, m.avatar_url AS author_avatar_url
             FROM inserted i JOIN members m ON m.id = i.author_id",
            &[&claims.sub, &content, &req.image_url],
        )
        .await?;

    debug!("Member {} posted to the feed", claims.sub);

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Posted.", post_from_row(&row))),
    ))
}

/// DELETE /api/posts/{id}
///
/// Scoped delete: only the author's own post goes away; anyone else's id is
/// a silent no-op.
pub async fn delete_post(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    let client = state.db_pool.get().await?;

    let affected = client
        .execute(
            "DELETE FROM posts WHERE id = $1 AND author_id = $2",
            &[&post_id, &claims.sub],
        )
        .await?;

    let message = if affected == 1 {
        "Post deleted."
    } else {
        "Nothing to delete."
    };

    Ok(Json(MessageResponse::new(message)))
}
