//! JWT service for token generation and validation
//!
//! Tokens are HS256-signed with a shared secret so the API service can verify
//! them with the same `JWT_SECRET`. Revocation lives in Redis, see
//! `common::cache::RedisPool::revoke_token`.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use shop::Claims;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::User;

/// Thirty days
const DEFAULT_TOKEN_EXPIRY: u64 = 30 * 24 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared signing secret
    pub secret: String,
    /// Token lifetime in seconds (default: 30 days)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Signing secret shared with the API service
    /// - `JWT_EXPIRY_SECONDS`: Token lifetime in seconds (default: 2592000)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        if secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 bytes");
        }

        let token_expiry = std::env::var("JWT_EXPIRY_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Generate a bearer token for a user
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = now_secs()?;

        let claims = Claims {
            sub: user.id,
            roles: Claims::roles_for(user.is_admin),
            iat: now,
            exp: now + self.config.token_expiry,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Seconds until `claims` expire, zero if already expired
    pub fn remaining_lifetime(&self, claims: &Claims) -> Result<u64> {
        Ok(claims.exp.saturating_sub(now_secs()?))
    }
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}
