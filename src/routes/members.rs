//! Member list and profile route handlers

use crate::auth::Claims;
use crate::error::{ApiResult, AppError};
use crate::members::{MemberSummary, ProfileUpdate};
use crate::models::SuccessResponse;
use crate::routes::auth::MemberResponse;
use crate::state::SharedState;
use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub hobbies: Option<String>,
}

/// GET /api/members
///
/// Every member except the caller, for the chat sidebar.
pub async fn list_members(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse<Vec<MemberSummary>>>> {
    let members = state.members.list_others(claims.sub).await?;

    Ok(Json(SuccessResponse::with_data("Members fetched.", members)))
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse<MemberResponse>>> {
    let member = state
        .members
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(Json(SuccessResponse::with_data(
        "Profile fetched.",
        MemberResponse::from(&member),
    )))
}

/// PUT /api/profile
///
/// Update the caller's bio, avatar or hobbies. Omitted fields are left
/// untouched.
pub async fn update_profile(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<SuccessResponse<MemberResponse>>> {
    debug!("Member {} updating profile", claims.sub);

    let member = state
        .members
        .update_profile(
            claims.sub,
            ProfileUpdate {
                bio: req.bio,
                avatar_url: req.avatar_url,
                hobbies: req.hobbies,
            },
        )
        .await?;

    Ok(Json(SuccessResponse::with_data(
        "Profile updated.",
        MemberResponse::from(&member),
    )))
}
