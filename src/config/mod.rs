use std::env;
use std::time::Duration;

use thiserror::Error;

const PEM_END_MARKER: &str = "-----END";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    /// PEM encoded public keys, tried in this order.
    pub jwt_public_keys: Vec<String>,
    pub hashing_key: String,
    pub email_host: String,
    pub token_cache_ttl_secs: u64,
    pub token_cache_capacity: u64,
    pub admin_account_ids: Vec<i64>,
    pub billing_service_url: String,
    pub notify_webhook_url: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("api_base_uri", &self.api_base_uri)
            .field("jwt_public_keys", &self.jwt_public_keys.len())
            .field("email_host", &self.email_host)
            .field("token_cache_ttl_secs", &self.token_cache_ttl_secs)
            .field("redis", &self.redis_url.is_some())
            .field("admin_account_ids", &self.admin_account_ids)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let keys = optional("JWT_PUBLIC_KEYS")
            .or_else(|| optional("JWT_PUBLIC_KEY"))
            .ok_or(ConfigError::Missing("JWT_PUBLIC_KEYS"))?;

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url: optional("REDIS_URL"),
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 3000)?,
            api_base_uri: optional("API_BASE_URI").unwrap_or_else(|| "/up".into()),
            jwt_public_keys: split_pem_blocks(&keys),
            hashing_key: required("HASHING_KEY")?,
            email_host: required("EMAIL_HOST")?,
            token_cache_ttl_secs: parse_or("TOKEN_CACHE_TTL_SECS", 300)?,
            token_cache_capacity: parse_or("TOKEN_CACHE_CAPACITY", 10_000)?,
            admin_account_ids: parse_id_list(
                "ADMIN_ACCOUNT_IDS",
                &optional("ADMIN_ACCOUNT_IDS").unwrap_or_default(),
            )?,
            billing_service_url: required("BILLING_SERVICE_URL")?,
            notify_webhook_url: optional("NOTIFY_WEBHOOK_URL"),
        })
    }

    pub fn token_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.token_cache_ttl_secs)
    }

    pub fn is_admin(&self, account_id: i64) -> bool {
        self.admin_account_ids.contains(&account_id)
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_id_list(name: &'static str, raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|e| ConfigError::Invalid {
                name,
                reason: format!("{s:?}: {e}"),
            })
        })
        .collect()
}

/// Splits a string holding one or more concatenated PEM blocks. Escaped
/// newlines (`\n`) are accepted so keys fit on a single env line.
pub fn split_pem_blocks(raw: &str) -> Vec<String> {
    let normalized = raw.replace("\\n", "\n");
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in normalized.lines().map(str::trim).filter(|l| !l.is_empty()) {
        current.push_str(line);
        current.push('\n');
        if line.starts_with(PEM_END_MARKER) {
            blocks.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        blocks.push(current);
    }
    blocks
}
