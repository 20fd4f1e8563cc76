//! Shared calendar route handlers
//!
//! Squad-wide events; creating one notifies everyone else.

use crate::auth::Claims;
use crate::error::{ApiResult, AppError};
use crate::models::{MessageResponse, SuccessResponse};
use crate::notifications::KIND_EVENT;
use crate::state::SharedState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    /// ISO date, e.g. "2026-09-12"
    pub date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i32,
    pub author_id: i32,
    pub author: String,
    pub title: String,
    pub date: NaiveDate,
}

fn event_from_row(row: &tokio_postgres::Row) -> CalendarEvent {
    CalendarEvent {
        id: row.get("id"),
        author_id: row.get("author_id"),
        author: row.get("author"),
        title: row.get("title"),
        date: row.get("event_date"),
    }
}

/// GET /api/calendar
///
/// All events ordered by date. Visiting the calendar marks the caller's
/// event notifications read.
pub async fn list_events(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse<Vec<CalendarEvent>>>> {
    state.notifications.mark_read(claims.sub, KIND_EVENT).await?;

    let client = state.db_pool.get().await?;

    let rows = client
        .query(
            "SELECT e.id, e.author_id, e.title, e.event_date,
                    m.username AS author
             FROM calendar_events e
             JOIN members m ON m.id = e.author_id
             ORDER BY e.event_date ASC",
            &[],
        )
        .await?;

    let events: Vec<CalendarEvent> = rows.iter().map(event_from_row).collect();

    Ok(Json(SuccessResponse::with_data("Events fetched.", events)))
}

/// POST /api/calendar
///
/// Create an event and notify every other member.
pub async fn create_event(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<CalendarEvent>>), AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Event title is required".to_string()));
    }
    let date: NaiveDate = req
        .date
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid event date: '{}'", req.date)))?;

    let client = state.db_pool.get().await?;

    let row = client
        .query_one(
            "WITH inserted AS (
                INSERT INTO calendar_events (author_id, title, event_date)
                VALUES ($1, $2, $3)
                RETURNING id, author_id, title, event_date
             )
             SELECT i.id, i.author_id, i.title, i.event_date,
                    m.username AS author
             FROM inserted i JOIN members m ON m.id = i.author_id",
            &[&claims.sub, &title, &date],
        )
        .await?;

    let event = event_from_row(&row);

    state
        .notifications
        .fan_out_to_others(claims.sub, KIND_EVENT, &format!("New Squad Event: {}", title))
        .await?;

    debug!("Member {} created event '{}'", claims.sub, title);

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data("Event created.", event)),
    ))
}

/// DELETE /api/calendar/{id}
///
/// Scoped delete: only the author can remove an event.
pub async fn delete_event(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    let client = state.db_pool.get().await?;

    let affected = client
        .execute(
            "DELETE FROM calendar_events WHERE id = $1 AND author_id = $2",
            &[&event_id, &claims.sub],
        )
        .await?;

    let message = if affected == 1 {
        "Event deleted."
    } else {
        "Nothing to delete."
    };

    Ok(Json(MessageResponse::new(message)))
}
