use std::sync::Arc;

use stocksync_types::errors::ApplicationError;

use crate::repository::*;

/// A Unit of Work (UoW) works as a provider for repositories
/// that all operate within a single transaction.
///
/// The catalog is the exception: its writes are applied record by record so
/// that one failing record never discards the others.
#[async_trait::async_trait]
pub trait UnitOfWork<'a>: Send + Sync {
    // Methods to access transactional repositories
    fn sync_jobs(&self) -> Arc<dyn SyncJobRepository + 'a>;
    fn owners(&self) -> Arc<dyn OwnerRepository + 'a>;
    fn settings(&self) -> Arc<dyn SettingsRepository + 'a>;
    fn catalog(&self) -> Arc<dyn CatalogRepository + 'a>;

    // Transaction control methods
    // Consume self to ensure the UoW is not used after commit/rollback
    async fn commit(self: Box<Self>) -> Result<(), ApplicationError>;
    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError>;
}

/// A factory for creating Unit of Work instances.
#[async_trait::async_trait]
pub trait UnitOfWorkProvider: Send + Sync {
    /// Begin a new Unit of Work (transaction).
    async fn tx<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError>;
}
