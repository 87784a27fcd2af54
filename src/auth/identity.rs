use std::sync::Arc;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{AppError, StoreError};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub creation_time: i64,
}

/// Read side of the account directory.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// `StoreError::NotFound` when no account carries `hash`.
    async fn lookup_by_hash(&self, hash: &str) -> Result<Account, StoreError>;

    /// Accounts created in `(since, until]`, both in microseconds.
    async fn list_since(&self, since: i64, until: i64) -> Result<Vec<Account>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub account_id: i64,
    pub username: String,
}

/// HMAC-SHA256 of `input` under the process hashing key, lowercase hex.
pub fn identity_hash(input: &str, key: &[u8]) -> Result<String, AppError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("invalid hashing key: {e}")))?;
    mac.update(input.as_bytes());
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Maps an externally issued username onto an internal account.
pub struct IdentityResolver {
    store: Arc<dyn AccountStore>,
    hashing_key: Vec<u8>,
    email_host: String,
}

impl IdentityResolver {
    pub fn new(
        store: Arc<dyn AccountStore>,
        hashing_key: impl Into<Vec<u8>>,
        email_host: impl Into<String>,
    ) -> Self {
        Self {
            store,
            hashing_key: hashing_key.into(),
            email_host: email_host.into(),
        }
    }

    /// Looks the username up as given, then as `username@email_host`.
    ///
    /// Returns the account id together with the form of the username that
    /// matched.
    pub async fn resolve(&self, username: &str) -> Result<ResolvedIdentity, AppError> {
        match self.lookup(username).await? {
            Some(account) => {
                tracing::debug!(account_id = account.id, "resolved username");
                return Ok(ResolvedIdentity {
                    account_id: account.id,
                    username: username.to_string(),
                });
            }
            None => tracing::debug!("no account for username, trying email form"),
        }

        let email = format!("{}@{}", username, self.email_host);
        match self.lookup(&email).await? {
            Some(account) => {
                tracing::debug!(account_id = account.id, "resolved email username");
                Ok(ResolvedIdentity {
                    account_id: account.id,
                    username: email,
                })
            }
            None => {
                tracing::warn!("no account found for username or its email form");
                Err(AppError::NotFound("no account for username".into()))
            }
        }
    }

    async fn lookup(&self, candidate: &str) -> Result<Option<Account>, AppError> {
        let hash = identity_hash(candidate, &self.hashing_key)?;
        match self.store.lookup_by_hash(&hash).await {
            Ok(account) => Ok(Some(account)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(AppError::Internal(format!("account lookup failed: {e}"))),
        }
    }
}
