use async_trait::async_trait;
use sqlx::PgPool;

use crate::deletion::{DeletionContext, LegacyDeletion};
use crate::error::StoreError;

/// Legacy emergency-contact records. An account can appear on either side
/// of a relationship and both must go before the account itself does.
#[derive(Clone)]
pub struct PgEmergencyContacts {
    pool: PgPool,
}

impl PgEmergencyContacts {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LegacyDeletion for PgEmergencyContacts {
    async fn handle_account_deletion(&self, ctx: &DeletionContext) -> Result<(), StoreError> {
        let removed = sqlx::query(
            r#"
            DELETE FROM emergency_contact
            WHERE user_id = $1 OR emergency_contact_id = $1
            "#,
        )
        .bind(ctx.account_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(removed, "removed emergency contact records");
        Ok(())
    }
}
