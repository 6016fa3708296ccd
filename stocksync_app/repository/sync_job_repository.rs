use chrono::Duration;
use uuid::Uuid;

use stocksync_types::errors::ApplicationError;

use crate::jobs::SyncJob;

/// TTL-bound storage for job documents, one per job id.
#[async_trait::async_trait]
pub trait SyncJobRepository: Send + Sync {
    /// Inserts or replaces the job document, resetting its expiry to
    /// `now + ttl`.
    async fn put(&self, job: &SyncJob, ttl: Duration) -> Result<(), ApplicationError>;

    /// Finds a job by id. Expired documents are reported as absent.
    async fn get(&self, id: Uuid) -> Result<Option<SyncJob>, ApplicationError>;

    /// Same as `get`, but keeps the document locked against other writers
    /// until the surrounding unit of work ends.
    async fn get_for_update(&self, id: Uuid) -> Result<Option<SyncJob>, ApplicationError>;

    /// Deletes the job document. Deleting a missing job is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), ApplicationError>;

    /// Removes every expired document, returning how many were dropped.
    async fn purge_expired(&self) -> Result<u64, ApplicationError>;
}
