//! Login throttle against password guessing
//!
//! Attempts are counted per normalized email. A successful login clears the
//! counter for that email.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Lockout duration in seconds
    pub lockout_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,
            lockout_seconds: 900,
        }
    }
}

#[derive(Debug)]
struct Attempts {
    count: u32,
    window_start: Instant,
    locked_until: Option<Instant>,
}

/// Per-key attempt counter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, Attempts>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        self.is_allowed_at(key, Instant::now()).await
    }

    async fn is_allowed_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.to_string()).or_insert(Attempts {
            count: 0,
            window_start: now,
            locked_until: None,
        });

        if let Some(until) = entry.locked_until {
            if now < until {
                return false;
            }
            entry.locked_until = None;
            entry.count = 0;
            entry.window_start = now;
        }

        if now.duration_since(entry.window_start) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.config.max_attempts {
            entry.locked_until = Some(now + Duration::from_secs(self.config.lockout_seconds));
            warn!(
                "Locked login for {} for {} seconds",
                key, self.config.lockout_seconds
            );
            return false;
        }

        entry.count += 1;
        true
    }

    /// Forget all attempts for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}
