//! Authentication route handlers
//!
//! Registration, login, token refresh and account deletion.

use crate::auth::{create_tokens, hash_password, refresh_tokens, verify_password, Claims, TokenPair};
use crate::error::{ApiResult, AppError};
use crate::members::Member;
use crate::state::SharedState;
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("username regex is valid")
});

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be between 3 and 32 characters"))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub hobbies: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: i32,
    pub username: String,
    pub hobbies: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            username: member.username.clone(),
            hobbies: member.hobbies.clone(),
            bio: member.bio.clone(),
            avatar_url: member.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub member: MemberResponse,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub member: MemberResponse,
}

fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if !USERNAME_RE.is_match(username) {
        let mut err = validator::ValidationError::new("invalid_username");
        err.message = Some("Username may only contain letters, digits and underscores".into());
        return Err(err);
    }
    Ok(())
}

// ============================================
// Route Handlers
// ============================================

/// POST /api/auth/register
///
/// Register a new squad member.
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let password_hash = hash_password(&req.password)?;

    let member = state
        .members
        .create(&req.username, &password_hash, req.hobbies.as_deref())
        .await?;

    info!("Member registered: {} (id: {})", member.username, member.id);

    let tokens = create_tokens(member.id, &member.username)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            member: MemberResponse::from(&member),
            tokens,
        }),
    ))
}

/// POST /api/auth/login
///
/// Authenticate with username and password, receive JWT tokens.
pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let member = state
        .members
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    if !verify_password(&req.password, &member.password_hash)? {
        return Err(AppError::Unauthorized("Invalid username or password".to_string()));
    }

    let tokens = create_tokens(member.id, &member.username)?;

    Ok(Json(AuthResponse {
        success: true,
        member: MemberResponse::from(&member),
        tokens,
    }))
}

/// POST /api/auth/refresh
///
/// Refresh access token using refresh token.
pub async fn refresh(
    State(_state): State<SharedState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = refresh_tokens(&req.refresh_token)?;

    Ok(Json(TokenResponse {
        success: true,
        tokens,
    }))
}

/// GET /api/auth/me
///
/// Get the calling member's profile.
pub async fn me(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<MeResponse>> {
    let member = state
        .members
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Member not found".to_string()))?;

    Ok(Json(MeResponse {
        success: true,
        member: MemberResponse::from(&member),
    }))
}

/// DELETE /api/auth/account
///
/// Delete the calling member's account. Posts, messages, events, votes and
/// notifications cascade away; ledger history stays (unattributed).
pub async fn delete_account(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<crate::models::MessageResponse>> {
    state.members.delete(claims.sub).await?;

    info!("Member {} deleted their account", claims.sub);

    Ok(Json(crate::models::MessageResponse::new(
        "Account deleted.",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation_rules() {
        let ok = RegisterRequest {
            username: "squad_rat_42".to_string(),
            password: "hunter2hunter2".to_string(),
            hobbies: None,
        };
        assert!(ok.validate().is_ok());

        let short_name = RegisterRequest {
            username: "ab".to_string(),
            password: "hunter2hunter2".to_string(),
            hobbies: None,
        };
        assert!(short_name.validate().is_err());

        let bad_chars = RegisterRequest {
            username: "not ok!".to_string(),
            password: "hunter2hunter2".to_string(),
            hobbies: None,
        };
        assert!(bad_chars.validate().is_err());

        let weak_password = RegisterRequest {
            username: "fine_name".to_string(),
            password: "short".to_string(),
            hobbies: None,
        };
        assert!(weak_password.validate().is_err());
    }
}
