//! Redis access for the storefront services
//!
//! The services only need Redis for one thing: remembering bearer tokens
//! revoked at logout until they would have expired on their own.

use anyhow::Result;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::{debug, info};

const REVOKED_TOKEN_PREFIX: &str = "revoked_token:";

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Result<Self> {
        Ok(RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        })
    }
}

/// Cheap-to-clone handle; connections are opened per call
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Validate the URL. No connection is made until the first command.
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        let info = client.get_connection_info();
        info!("Redis client ready for {}/{}", info.addr, info.redis.db);
        Ok(RedisPool { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// Store `value` under `key`, expiring after `ttl_seconds` when given
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let mut conn = self.connection().await?;
        match ttl_seconds {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Reject `token` for the next `ttl_seconds`
    pub async fn revoke_token(&self, token: &str, ttl_seconds: u64) -> Result<()> {
        // SETEX rejects a zero TTL; an already expired token needs no entry
        if ttl_seconds == 0 {
            return Ok(());
        }
        self.set(&revoked_token_key(token), "1", Some(ttl_seconds))
            .await?;
        debug!("Token revoked for {} seconds", ttl_seconds);
        Ok(())
    }

    pub async fn is_token_revoked(&self, token: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        Ok(conn.exists(revoked_token_key(token)).await?)
    }

    /// Check if Redis answers PING
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

/// Redis key under which a revoked token is recorded
pub fn revoked_token_key(token: &str) -> String {
    format!("{REVOKED_TOKEN_PREFIX}{token}")
}
