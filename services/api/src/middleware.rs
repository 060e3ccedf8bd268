//! Authentication middleware for bearer token validation
//!
//! Tokens are issued by the auth service and signed with the shared
//! `JWT_SECRET`. A token revoked at logout is rejected until it expires.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use shop::Claims;
use std::env;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub claims: Claims,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret shared with the auth service
    pub secret: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Signing secret shared with the auth service
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        Ok(JwtConfig { secret })
    }
}

/// Verifies bearer tokens, built once at startup
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.verifier.verify(token).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        ApiError::Unauthorized
    })?;

    let revoked = state
        .redis_pool
        .is_token_revoked(token)
        .await
        .map_err(|e| {
            error!("Failed to check token revocation: {}", e);
            ApiError::InternalServerError
        })?;

    if revoked {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        claims,
    });

    Ok(next.run(req).await)
}

/// Only administrators pass. Must run after `auth_middleware`.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin() => Ok(next.run(req).await),
        Some(_) => Err(ApiError::Forbidden),
        None => Err(ApiError::Unauthorized),
    }
}
