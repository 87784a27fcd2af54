// 令牌身份缓存：原始令牌 -> 已验证的外部用户名

pub mod keys;
pub mod models;
pub mod operations;

use async_trait::async_trait;

use crate::error::AppError;

pub use operations::{MemoryIdentityCache, RedisIdentityCache};

/// Short lived mapping from a raw credential to the identity it verified as.
///
/// A hit stands in for a fresh verification until the entry expires.
#[async_trait]
pub trait IdentityCache: Send + Sync {
    async fn get(&self, raw_token: &str) -> Option<String>;

    async fn insert(&self, raw_token: &str, username: &str);
}

/// Returns the cached identity for `raw_token`, running `verify` and caching
/// its result on a miss. Failed verifications are never cached.
pub async fn cached_identity<F>(
    cache: &dyn IdentityCache,
    raw_token: &str,
    verify: F,
) -> Result<String, AppError>
where
    F: FnOnce(&str) -> Result<String, AppError>,
{
    if let Some(username) = cache.get(raw_token).await {
        tracing::debug!("identity cache hit");
        return Ok(username);
    }

    let username = verify(raw_token)?;
    cache.insert(raw_token, &username).await;
    Ok(username)
}
