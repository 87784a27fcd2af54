//! Account deletion across the legacy, billing and core subsystems.
//!
//! The deleter owns the ordering; none of the collaborators call each other.
//! Steps run strictly in sequence and stop at the first failure. Completed
//! steps are never rolled back.

mod collaborators;
mod context;

use std::sync::Arc;

use tracing::Instrument;

pub use collaborators::{
    AccountDeletion, BillingCancellation, DeletionReceipt, LegacyDeletion, Notifier,
};
pub use context::{DELETION_LOG_CONTEXT, DeletionContext};

use crate::auth::IdentityResolver;
use crate::error::{AppError, DeletionStep};

pub struct AccountDeleter {
    resolver: Arc<IdentityResolver>,
    legacy: Arc<dyn LegacyDeletion>,
    billing: Arc<dyn BillingCancellation>,
    core: Arc<dyn AccountDeletion>,
    notifier: Arc<dyn Notifier>,
}

impl AccountDeleter {
    pub fn new(
        resolver: Arc<IdentityResolver>,
        legacy: Arc<dyn LegacyDeletion>,
        billing: Arc<dyn BillingCancellation>,
        core: Arc<dyn AccountDeletion>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resolver,
            legacy,
            billing,
            core,
            notifier,
        }
    }

    /// Deletes the account behind `target_username` on behalf of `admin_id`.
    ///
    /// The notification is dispatched in the background after the core
    /// deletion succeeded and is not awaited.
    pub async fn delete_account(
        &self,
        admin_id: i64,
        target_username: &str,
        request_id: &str,
    ) -> Result<DeletionReceipt, AppError> {
        let target_username = target_username.trim();
        if target_username.is_empty() {
            return Err(AppError::BadRequest("username is missing".into()));
        }

        let resolved = self.resolver.resolve(target_username).await?;
        let ctx = DeletionContext::new(
            resolved.account_id,
            admin_id,
            resolved.username,
            request_id.to_string(),
        );
        let account_id = ctx.account_id;

        self.legacy
            .handle_account_deletion(&ctx)
            .instrument(ctx.span().clone())
            .await
            .map_err(|cause| {
                tracing::error!(parent: ctx.span(), "legacy cleanup failed: {}", cause);
                AppError::Upstream {
                    step: DeletionStep::LegacyCleanup,
                    account_id,
                    cause,
                }
            })?;

        let canceled = self
            .billing
            .cancel_and_confirm(account_id)
            .instrument(ctx.span().clone())
            .await
            .map_err(|cause| {
                tracing::error!(parent: ctx.span(), "subscription cancellation failed: {}", cause);
                AppError::Upstream {
                    step: DeletionStep::BillingCancellation,
                    account_id,
                    cause,
                }
            })?;
        if !canceled {
            tracing::error!(parent: ctx.span(), "billing did not confirm subscription cancellation");
            return Err(AppError::Unconfirmed {
                step: DeletionStep::BillingCancellation,
                account_id,
            });
        }

        let receipt = self
            .core
            .handle_account_deletion(&ctx)
            .instrument(ctx.span().clone())
            .await
            .map_err(|cause| {
                tracing::error!(parent: ctx.span(), "account deletion failed: {}", cause);
                AppError::Upstream {
                    step: DeletionStep::CoreDeletion,
                    account_id,
                    cause,
                }
            })?;

        tracing::info!(parent: ctx.span(), "account deleted");
        self.dispatch_notification(&ctx);
        Ok(receipt)
    }

    fn dispatch_notification(&self, ctx: &DeletionContext) {
        let notifier = self.notifier.clone();
        let message = format!(
            "Admin ({}) deleting account for {}",
            ctx.admin_id, ctx.account_id
        );
        let span = ctx.span().clone();

        tokio::spawn(
            async move {
                if let Err(e) = notifier.notify(&message).await {
                    tracing::warn!(step = %DeletionStep::Notifying, "notification failed: {}", e);
                }
            }
            .instrument(span),
        );
    }
}
