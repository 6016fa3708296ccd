use chrono::{Duration, Utc};
use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use stocksync_app::{jobs::SyncJob, repository::SyncJobRepository};
use stocksync_types::{
    Result,
    errors::{ApplicationError, DbError},
};

use crate::models as db_models;

const SELECT_LIVE_JOB: &str = r#"
    SELECT id, owner_id, document
    FROM sync_jobs
    WHERE id = $1 AND expires_at > now()
"#;

#[derive(Clone)]
pub struct PostgresSyncJobRepository<'a> {
    tx: Arc<Mutex<Transaction<'a, Postgres>>>,
}

impl<'a> PostgresSyncJobRepository<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Postgres>>>) -> Self {
        Self { tx }
    }

    async fn fetch(&self, sql: &str, id: Uuid) -> Result<Option<SyncJob>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let row = sqlx::query_as::<_, db_models::SyncJobRow>(sql)
            .bind(id)
            .fetch_optional(&mut *tx_guard.as_mut())
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl<'a> SyncJobRepository for PostgresSyncJobRepository<'a> {
    async fn put(&self, job: &SyncJob, ttl: Duration) -> Result<(), ApplicationError> {
        let expires_at = Utc::now() + ttl;
        let mut tx_guard = self.tx.lock().await;
        sqlx::query(
            r#"
            INSERT INTO sync_jobs (id, owner_id, document, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET document = EXCLUDED.document,
                expires_at = EXCLUDED.expires_at,
                updated_at = now()
            "#,
        )
        .bind(job.id)
        .bind(job.owner_id)
        .bind(Json(job))
        .bind(expires_at)
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SyncJob>, ApplicationError> {
        self.fetch(SELECT_LIVE_JOB, id).await
    }

    async fn get_for_update(&self, id: Uuid) -> Result<Option<SyncJob>, ApplicationError> {
        self.fetch(&format!("{SELECT_LIVE_JOB} FOR UPDATE"), id)
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        sqlx::query("DELETE FROM sync_jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx_guard.as_mut())
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let result = sqlx::query("DELETE FROM sync_jobs WHERE expires_at <= now()")
            .execute(&mut *tx_guard.as_mut())
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(result.rows_affected())
    }
}
