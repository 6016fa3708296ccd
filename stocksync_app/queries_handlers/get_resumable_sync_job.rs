use async_trait::async_trait;
use std::sync::Arc;

use stocksync_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{
        Query, QueryHandler,
        queries::{GetResumableSyncJob, ResumableSyncJob},
    },
    uow::UnitOfWork,
};

pub struct GetResumableSyncJobHandler {}

impl GetResumableSyncJobHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl QueryHandler<GetResumableSyncJob> for GetResumableSyncJobHandler {
    async fn handle(
        &self,
        query: GetResumableSyncJob,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<<GetResumableSyncJob as Query>::Output, ApplicationError> {
        let Some(job_id) = uow.owners().last_job(query.owner_id).await? else {
            return Ok(None);
        };

        // The pointer can outlive its job until the sweeper catches up.
        Ok(uow
            .sync_jobs()
            .get(job_id)
            .await?
            .map(|job| ResumableSyncJob {
                job_id,
                status: (&job).into(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::{
        command_handlers::CreateSyncJobCommandHandler,
        cqrs::{CommandHandler, commands::CreateSyncJob},
        test_utils::tests::{MockStore, MockUnitOfWork},
    };

    #[tokio::test]
    async fn test_resumable_job_for_owner() -> Result<(), ApplicationError> {
        let store = MockStore::new();
        store.catalog.add_product(1, "A", &[]);
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::with_store(&store));
        let config = Arc::new(Config::default());
        let owner_id = Uuid::new_v4();

        let created = CreateSyncJobCommandHandler::new()
            .handle(
                CreateSyncJob::new(owner_id, b"Sku,Available,Price\nA,1,1\nB,1,1\n".to_vec()),
                &mock_uow,
                &config,
            )
            .await?;

        let resumable = GetResumableSyncJobHandler::new()
            .handle(GetResumableSyncJob { owner_id }, &mock_uow, &config)
            .await?
            .unwrap();
        assert_eq!(resumable.job_id, created.job_id);
        assert_eq!(resumable.status.total, 1);
        assert_eq!(resumable.status.missing, 1);

        let other = GetResumableSyncJobHandler::new()
            .handle(
                GetResumableSyncJob {
                    owner_id: Uuid::new_v4(),
                },
                &mock_uow,
                &config,
            )
            .await?;
        assert!(other.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_pointer_is_not_resumable() -> Result<(), ApplicationError> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let config = Arc::new(Config::default());
        let owner_id = Uuid::new_v4();
        mock_uow
            .owners()
            .remember_last_job(owner_id, Uuid::new_v4(), Duration::minutes(30))
            .await?;

        let resumable = GetResumableSyncJobHandler::new()
            .handle(GetResumableSyncJob { owner_id }, &mock_uow, &config)
            .await?;
        assert!(resumable.is_none());
        Ok(())
    }
}
