use std::{sync::Arc, time::Duration};
use tokio::time;

use stocksync_types::errors::ApplicationError;

use crate::{config::Config, uow::UnitOfWorkProvider};

/// Periodically drops expired job documents and resume pointers, so expiry
/// does not depend on somebody reading them.
pub struct ExpiredJobSweeper {
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    config: Arc<Config>,
}

impl ExpiredJobSweeper {
    pub fn new(uow_provider: Arc<dyn UnitOfWorkProvider>, config: Arc<Config>) -> Self {
        Self {
            uow_provider,
            config,
        }
    }

    /// Run sweeper loop inside a tokio task.
    pub fn run(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(self.config.sweep_interval_secs));
            tracing::info!("Expired job sweeper started.");

            loop {
                interval.tick().await;
                if let Err(e) = self.sweep().await {
                    tracing::error!("Error while sweeping expired jobs: {e}");
                }
            }
        });
    }

    /// Purges once, returning how many jobs and pointers were removed.
    pub async fn sweep(&self) -> Result<(u64, u64), ApplicationError> {
        let uow = self.uow_provider.tx().await?;

        let purged = async {
            let jobs = uow.sync_jobs().purge_expired().await?;
            let owners = uow.owners().purge_expired().await?;
            Ok::<_, ApplicationError>((jobs, owners))
        }
        .await;

        match purged {
            Ok((jobs, owners)) => {
                uow.commit().await?;
                if jobs > 0 || owners > 0 {
                    tracing::info!(jobs, owners, "Expired sync jobs purged");
                }
                Ok((jobs, owners))
            }
            Err(e) => {
                uow.rollback().await?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::{
        jobs::{SyncJob, SyncJobOptions},
        repository::{OwnerRepository, SyncJobRepository},
        test_utils::tests::MockUnitOfWorkProvider,
    };

    #[tokio::test]
    async fn test_sweep_purges_only_expired() -> Result<(), ApplicationError> {
        let provider = MockUnitOfWorkProvider::new();
        let store = provider.store().clone();
        let sweeper = ExpiredJobSweeper::new(Arc::new(provider), Arc::new(Config::default()));

        let owner_id = Uuid::new_v4();
        let stale = SyncJob::new(Uuid::new_v4(), owner_id, Vec::new(), 0, SyncJobOptions::default());
        let alive = SyncJob::new(Uuid::new_v4(), owner_id, Vec::new(), 0, SyncJobOptions::default());
        let ttl = Duration::minutes(30);
        store.sync_jobs.put(&stale, ttl).await?;
        store.sync_jobs.put(&alive, ttl).await?;
        store.owners.remember_last_job(owner_id, stale.id, ttl).await?;
        store.sync_jobs.expire(stale.id);
        store.owners.expire(owner_id);

        assert_eq!(sweeper.sweep().await?, (1, 1));
        assert_eq!(store.sync_jobs.len(), 1);
        assert!(store.sync_jobs.get(alive.id).await?.is_some());

        assert_eq!(sweeper.sweep().await?, (0, 0));
        Ok(())
    }
}
