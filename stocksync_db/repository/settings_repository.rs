use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use stocksync_app::repository::SettingsRepository;
use stocksync_types::{
    Result,
    errors::{ApplicationError, DbError},
    pricing::PriceAdjust,
};

const PRICE_ADJUST_KEY: &str = "price_adjust";

#[derive(Clone)]
pub struct PostgresSettingsRepository<'a> {
    tx: Arc<Mutex<Transaction<'a, Postgres>>>,
}

impl<'a> PostgresSettingsRepository<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Postgres>>>) -> Self {
        Self { tx }
    }
}

#[async_trait::async_trait]
impl<'a> SettingsRepository for PostgresSettingsRepository<'a> {
    async fn load_price_adjust(&self) -> Result<Option<PriceAdjust>, ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        let value = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM sync_settings WHERE key = $1",
        )
        .bind(PRICE_ADJUST_KEY)
        .fetch_optional(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        match value {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(|e| ApplicationError::Db(DbError::Json(e)))?,
            )),
            None => Ok(None),
        }
    }

    async fn save_price_adjust(&self, adjust: &PriceAdjust) -> Result<(), ApplicationError> {
        let mut tx_guard = self.tx.lock().await;
        sqlx::query(
            r#"
            INSERT INTO sync_settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(PRICE_ADJUST_KEY)
        .bind(Json(adjust))
        .execute(&mut *tx_guard.as_mut())
        .await
        .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        Ok(())
    }
}
