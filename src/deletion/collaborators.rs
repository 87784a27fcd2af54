use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DeletionContext;
use crate::error::StoreError;

/// Proof of removal returned by the core account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReceipt {
    pub account_id: i64,
    pub deleted_at: DateTime<Utc>,
}

/// Clears legacy emergency-deletion records that reference the account.
#[async_trait]
pub trait LegacyDeletion: Send + Sync {
    async fn handle_account_deletion(&self, ctx: &DeletionContext) -> Result<(), StoreError>;
}

/// Cancels the account's subscription. `Ok(false)` means the billing system
/// could not confirm the cancellation.
#[async_trait]
pub trait BillingCancellation: Send + Sync {
    async fn cancel_and_confirm(&self, account_id: i64) -> Result<bool, StoreError>;
}

/// Authoritative removal of the account record.
#[async_trait]
pub trait AccountDeletion: Send + Sync {
    async fn handle_account_deletion(
        &self,
        ctx: &DeletionContext,
    ) -> Result<DeletionReceipt, StoreError>;
}

/// Operational notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), StoreError>;
}
