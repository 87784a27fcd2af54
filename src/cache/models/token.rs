use serde::{Deserialize, Serialize};

/// 令牌缓存数据模型
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedIdentity {
    pub username: String,
    pub cached_at: i64, // Unix timestamp
}
