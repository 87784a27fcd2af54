use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{IdentityCache, keys::identity_token_key, models::CachedIdentity};

/// Shares verified identities between replicas. Redis errors are logged and
/// treated as a miss so an unavailable cache only costs a re-verification.
pub struct RedisIdentityCache {
    redis: Arc<RedisClient>,
    ttl: Duration,
}

impl RedisIdentityCache {
    pub fn new(redis: Arc<RedisClient>, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    async fn read(&self, raw_token: &str) -> Result<Option<CachedIdentity>, redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let key = identity_token_key(raw_token);
        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(json) => {
                let cached = serde_json::from_str(&json).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "反序列化错误",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(cached))
            }
            None => Ok(None),
        }
    }

    async fn write(&self, raw_token: &str, username: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let cached = CachedIdentity {
            username: username.to_string(),
            cached_at: chrono::Utc::now().timestamp(),
        };

        let key = identity_token_key(raw_token);
        let json = serde_json::to_string(&cached).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "序列化错误", e.to_string()))
        })?;

        let _: () = conn.set_ex(key, json, self.ttl.as_secs().max(1)).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityCache for RedisIdentityCache {
    async fn get(&self, raw_token: &str) -> Option<String> {
        match self.read(raw_token).await {
            Ok(cached) => cached.map(|c| c.username),
            Err(e) => {
                tracing::warn!("identity cache read failed: {}", e);
                None
            }
        }
    }

    async fn insert(&self, raw_token: &str, username: &str) {
        if let Err(e) = self.write(raw_token, username).await {
            tracing::warn!("identity cache write failed: {}", e);
        }
    }
}
