use chrono::{Duration, Utc};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use stocksync_app::repository::OwnerRepository;
use stocksync_types::{
    Result,
    errors::{ApplicationError, DbError},
};

#[derive(Clone)]
pub struct PostgresOwnerRepository<'a> {
    tx: Arc<Mutex<Transaction<'a, Postgres>>>,
}

impl<'a> PostgresOwnerRepository<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Postgres>>>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl<'a> OwnerRepository for PostgresOwnerRepository<'a> {
    async fn remember_last_job(
        &self,
        owner_id: Uuid,
        job_id: Uuid,
        ttl: Duration,
    ) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        sqlx::query(
            r#"
            INSERT INTO sync_job_owners (owner_id, job_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner_id) DO UPDATE
            SET job_id = EXCLUDED.job_id, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(owner_id)
        .bind(job_id)
        .bind(Utc::now() + ttl)
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(())
    }

    async fn forget_last_job(&self, owner_id: Uuid) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        sqlx::query("DELETE FROM sync_job_owners WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&mut *tx_guard.as_mut())
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(())
    }

    async fn last_job(&self, owner_id: Uuid) -> Result<Option<Uuid>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let job_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT job_id FROM sync_job_owners WHERE owner_id = $1 AND expires_at > now()",
        )
        .bind(owner_id)
        .fetch_optional(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(job_id)
    }

    async fn purge_expired(&self) -> Result<u64, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let result = sqlx::query("DELETE FROM sync_job_owners WHERE expires_at <= now()")
            .execute(&mut *tx_guard.as_mut())
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(result.rows_affected())
    }
}
