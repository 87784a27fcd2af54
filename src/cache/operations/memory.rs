use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::cache::IdentityCache;

/// In-process identity cache. Entries expire a fixed time after insertion.
pub struct MemoryIdentityCache {
    entries: Cache<String, String>,
}

impl MemoryIdentityCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }
}

#[async_trait]
impl IdentityCache for MemoryIdentityCache {
    async fn get(&self, raw_token: &str) -> Option<String> {
        self.entries.get(raw_token).await
    }

    async fn insert(&self, raw_token: &str, username: &str) {
        self.entries
            .insert(raw_token.to_string(), username.to_string())
            .await;
    }
}
