//! Notification route handlers

use crate::auth::Claims;
use crate::error::ApiResult;
use crate::models::SuccessResponse;
use crate::notifications::{Notification, UnreadCounts};
use crate::state::SharedState;
use axum::{
    extract::{Extension, State},
    Json,
};

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse<Vec<Notification>>>> {
    let notifications = state.notifications.list(claims.sub).await?;

    Ok(Json(SuccessResponse::with_data(
        "Notifications fetched.",
        notifications,
    )))
}

/// GET /api/notifications/unread
///
/// Unread message and notification counts for the client's badges.
pub async fn unread_counts(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse<UnreadCounts>>> {
    let counts = state.notifications.unread_counts(claims.sub).await?;

    Ok(Json(SuccessResponse::with_data("Unread counts.", counts)))
}
