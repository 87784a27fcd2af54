use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool};

use crate::auth::{Account, AccountStore};
use crate::deletion::{AccountDeletion, DeletionContext, DeletionReceipt};
use crate::error::StoreError;

#[derive(Debug, FromRow)]
struct AccountRow {
    user_id: i64,
    creation_time: i64,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.user_id,
            creation_time: row.creation_time,
        }
    }
}

/// Account directory backed by the `users` table.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn lookup_by_hash(&self, hash: &str) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT user_id, creation_time
            FROM users
            WHERE email_hash = $1
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from).ok_or(StoreError::NotFound)
    }

    async fn list_since(&self, since: i64, until: i64) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT user_id, creation_time
            FROM users
            WHERE creation_time > $1 AND creation_time <= $2
            ORDER BY creation_time
            "#,
        )
        .bind(since)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }
}

/// Removes the account row and its session tokens in one transaction.
#[derive(Clone)]
pub struct PgAccountDeletion {
    pool: PgPool,
}

impl PgAccountDeletion {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDeletion for PgAccountDeletion {
    async fn handle_account_deletion(
        &self,
        ctx: &DeletionContext,
    ) -> Result<DeletionReceipt, StoreError> {
        let mut tx = self.pool.begin().await?;

        let tokens = sqlx::query("DELETE FROM tokens WHERE user_id = $1")
            .bind(ctx.account_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted: Option<(i64,)> =
            sqlx::query_as("DELETE FROM users WHERE user_id = $1 RETURNING user_id")
                .bind(ctx.account_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((account_id,)) = deleted else {
            tx.rollback().await?;
            return Err(StoreError::NotFound);
        };
        tx.commit().await?;

        tracing::info!(tokens, "removed account record");
        Ok(DeletionReceipt {
            account_id,
            deleted_at: Utc::now(),
        })
    }
}
