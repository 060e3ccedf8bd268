//! Middleware for JWT token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use shop::Claims;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{AppState, error::AuthError};

/// Identity of the caller, inserted into request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub claims: Claims,
    pub token: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extract and validate JWT token from Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())
        .ok_or(AuthError::Unauthorized)?
        .to_string();

    let claims = state.jwt_service.validate_token(&token).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        AuthError::Unauthorized
    })?;

    let revoked = state
        .redis_pool
        .is_token_revoked(&token)
        .await
        .map_err(|e| {
            error!("Failed to check token revocation: {}", e);
            AuthError::InternalServerError
        })?;

    if revoked {
        return Err(AuthError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        claims,
        token,
    });

    Ok(next.run(req).await)
}

/// Reject callers without the admin role. Must run after `auth_middleware`.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, AuthError> {
    match req.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin() => Ok(next.run(req).await),
        Some(_) => Err(AuthError::Forbidden),
        None => Err(AuthError::Unauthorized),
    }
}
