use chrono::Duration;
use uuid::Uuid;

use stocksync_types::errors::ApplicationError;

/// Remembers the last job started by each owner, so it can be resumed on a
/// later visit.
#[async_trait::async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn remember_last_job(
        &self,
        owner_id: Uuid,
        job_id: Uuid,
        ttl: Duration,
    ) -> Result<(), ApplicationError>;

    async fn forget_last_job(&self, owner_id: Uuid) -> Result<(), ApplicationError>;

    async fn last_job(&self, owner_id: Uuid) -> Result<Option<Uuid>, ApplicationError>;

    async fn purge_expired(&self) -> Result<u64, ApplicationError>;
}
