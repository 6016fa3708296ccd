use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use stocksync_app::{
    repository::*,
    uow::{UnitOfWork, UnitOfWorkProvider},
};
use stocksync_types::errors::{ApplicationError, DbError};

use crate::repository::*;

#[derive(Debug, Clone)]
pub struct PostgresUnitOfWorkProvider {
    pool: PgPool,
    catalog_pool: PgPool,
}

impl PostgresUnitOfWorkProvider {
    /// `catalog_pool` must not be `pool`: catalog statements run while the
    /// unit of work still holds its transaction connection.
    pub fn new(pool: PgPool, catalog_pool: PgPool) -> Self {
        Self { pool, catalog_pool }
    }
}

#[async_trait::async_trait]
impl UnitOfWorkProvider for PostgresUnitOfWorkProvider {
    async fn tx<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;

        // Transaction must be 'static to be stored in Arc.
        let tx_arc = Arc::new(Mutex::new(tx));

        Ok(Box::new(PostgresUnitOfWork {
            tx: tx_arc,
            catalog_pool: self.catalog_pool.clone(),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct PostgresUnitOfWork<'a> {
    tx: Arc<Mutex<Transaction<'a, Postgres>>>,
    catalog_pool: PgPool,
}

impl<'a> PostgresUnitOfWork<'a> {
    pub fn new(tx: Arc<Mutex<Transaction<'a, Postgres>>>, catalog_pool: PgPool) -> Self {
        Self { tx, catalog_pool }
    }
}

#[async_trait::async_trait]
impl<'a> UnitOfWork<'a> for PostgresUnitOfWork<'a> {
    fn sync_jobs(&self) -> Arc<dyn SyncJobRepository + 'a> {
        Arc::new(PostgresSyncJobRepository::new(self.tx.clone()))
    }

    fn owners(&self) -> Arc<dyn OwnerRepository + 'a> {
        Arc::new(PostgresOwnerRepository::new(self.tx.clone()))
    }

    fn settings(&self) -> Arc<dyn SettingsRepository + 'a> {
        Arc::new(PostgresSettingsRepository::new(self.tx.clone()))
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository + 'a> {
        Arc::new(PostgresCatalogRepository::new(self.catalog_pool.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
        // Try to unwrap the Arc to get ownership of the Mutex<Transaction>.
        // If this fails, it means there are other references to the Arc,
        // the transaction cannot be committed (logical error) and will rollback on Drop.
        if let Ok(mutex) = Arc::try_unwrap(self.tx) {
            mutex
                .into_inner()
                .commit()
                .await
                .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;
        } else {
            return Err(ApplicationError::Db(DbError::Transaction(
                "transaction still has multiple owners".to_string(),
            )));
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
        if let Ok(mutex) = Arc::try_unwrap(self.tx) {
            mutex
                .into_inner()
                .rollback()
                .await
                .map_err(|e| ApplicationError::Db(DbError::Database(e)))?;
        }
        Ok(())
    }
}
