//! Authentication middleware
//!
//! Extracts and validates JWT tokens from requests.

use crate::auth::{decode_token, TokenType};
use crate::error::AppError;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use axum::http::header::AUTHORIZATION;

/// Extract claims from the request and stash them in extensions
pub async fn auth_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

    let claims = decode_token(token)?;

    if claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized("Refresh token cannot be used for API access".to_string()));
    }

    // Handlers read the caller's identity from here
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
