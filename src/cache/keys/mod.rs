// 缓存键模块
use sha2::{Digest, Sha256};

pub const TOKEN_KEY_PREFIX: &str = "up_token";

/// Redis key for a raw credential. The credential itself is digested so
/// bearer tokens never sit in the shared cache in clear.
pub fn identity_token_key(raw_token: &str) -> String {
    let digest = Sha256::digest(raw_token.as_bytes());
    format!("{}:{:x}", TOKEN_KEY_PREFIX, digest)
}
