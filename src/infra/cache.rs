//! Redis-backed view cache and login throttle counters.
//!
//! Rendered read views live under `view:<tag>:<key>` and are dropped a whole
//! tag at a time when the underlying rows change. Callers treat the cache as
//! optional: a miss, an outage or a failed invalidation never fails a request.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{
    Config, CACHE_PREFIX_RATE_LIMIT, CACHE_PREFIX_VIEW, DEFAULT_CACHE_TTL_SECONDS,
    VIEW_TAG_NOTIFICATIONS,
};
use crate::errors::{AppError, AppResult};

/// INCR that arms the expiry only on the first hit of a window.
const RATE_LIMIT_SCRIPT: &str = r#"
    local count = redis.call("INCR", KEYS[1])
    if count == 1 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    return count
"#;

#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    view_ttl: u64,
}

impl Cache {
    pub async fn try_connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            view_ttl: DEFAULT_CACHE_TTL_SECONDS,
        })
    }

    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(key).await?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| AppError::internal(format!("Cached view is unreadable: {}", e)))
        })
        .transpose()
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("View is not serializable: {}", e)))?;

        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, json, self.view_ttl).await?;
        Ok(())
    }

    async fn purge(&self, pattern: &str) -> AppResult<usize> {
        let mut conn = self.connection.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let removed: usize = conn.del(&keys).await?;
        Ok(removed)
    }

    /// Cached view, or `None` on a miss or when Redis misbehaves.
    pub async fn get_view<T: DeserializeOwned>(&self, tag: &str, key: &str) -> Option<T> {
        self.read_json(&view_key(tag, key))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(tag, key, "view cache read failed: {}", e);
                None
            })
    }

    pub async fn set_view<T: Serialize>(&self, tag: &str, key: &str, value: &T) {
        if let Err(e) = self.write_json(&view_key(tag, key), value).await {
            tracing::warn!(tag, key, "view cache write failed: {}", e);
        }
    }

    pub async fn invalidate_tag(&self, tag: &str) {
        match self.purge(&tag_pattern(tag)).await {
            Ok(count) => tracing::debug!(tag, count, "view tag invalidated"),
            Err(e) => tracing::warn!(tag, "view tag invalidation failed: {}", e),
        }
    }

    /// Counts one attempt for `identifier` inside a fixed window.
    ///
    /// Returns the attempt number and whether it is still within `max_requests`.
    /// The window opens on the first attempt and is not extended by later ones.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: u64 = redis::cmd("EVAL")
            .arg(RATE_LIMIT_SCRIPT)
            .arg(1)
            .arg(&key)
            .arg(window_seconds)
            .query_async(&mut conn)
            .await?;

        Ok((count, count <= max_requests))
    }
}

/// Tag under which one user's notification feed is cached.
pub fn notifications_tag(user_id: uuid::Uuid) -> String {
    format!("{}:{}", VIEW_TAG_NOTIFICATIONS, user_id)
}

fn view_key(tag: &str, key: &str) -> String {
    format!("{}{}:{}", CACHE_PREFIX_VIEW, tag, key)
}

fn tag_pattern(tag: &str) -> String {
    format!("{}{}:*", CACHE_PREFIX_VIEW, tag)
}
