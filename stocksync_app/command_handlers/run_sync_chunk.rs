use chrono::Duration;
use std::sync::Arc;

use stocksync_types::{Result, errors::AppError};

use crate::{
    command_handlers::helpers::forget_if_last_job,
    config::Config,
    cqrs::{CommandHandler, commands::RunSyncChunk},
    jobs::{ChunkExecutor, ChunkOutcome, SyncJob},
    uow::UnitOfWork,
};

pub struct RunSyncChunkCommandHandler {}

impl Default for RunSyncChunkCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSyncChunkCommandHandler {
    pub fn new() -> Self {
        Self {}
    }

    async fn finish(&self, uow: &Box<dyn UnitOfWork<'_> + '_>, job: &SyncJob) -> Result<()> {
        uow.sync_jobs().delete(job.id).await?;
        forget_if_last_job(uow, job.owner_id, job.id).await?;

        tracing::info!(
            job_id = %job.id,
            processed = job.processed,
            updated = job.updated,
            missing = job.missing,
            errors = job.errors,
            "Sync job finished"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommandHandler<RunSyncChunk> for RunSyncChunkCommandHandler {
    async fn handle(
        &self,
        command: RunSyncChunk,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<ChunkOutcome> {
        let jobs = uow.sync_jobs();

        if command.peek {
            let job = jobs
                .get(command.job_id)
                .await?
                .ok_or(AppError::SyncJobNotFound(command.job_id))?;
            return Ok(ChunkOutcome::peek(&job));
        }

        let mut job = jobs
            .get_for_update(command.job_id)
            .await?
            .ok_or(AppError::SyncJobNotFound(command.job_id))?;

        if job.is_complete() {
            self.finish(uow, &job).await?;
            return Ok(ChunkOutcome {
                status: (&job).into(),
                log: Vec::new(),
                done: true,
            });
        }

        let executor = ChunkExecutor::new(uow.catalog());
        let log = executor.advance(&mut job).await?;

        let done = job.is_complete();
        if done {
            self.finish(uow, &job).await?;
        } else {
            let ttl = Duration::seconds(config.job_ttl_secs);
            jobs.put(&job, ttl).await?;

            let owners = uow.owners();
            if owners.last_job(job.owner_id).await? == Some(job.id) {
                owners.remember_last_job(job.owner_id, job.id, ttl).await?;
            }
        }

        Ok(ChunkOutcome {
            status: (&job).into(),
            log,
            done,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use uuid::Uuid;

    use stocksync_types::{catalog::StockStatus, errors::ApplicationError};

    use super::*;
    use crate::{
        app::AppBus,
        command_handlers::CreateSyncJobCommandHandler,
        cqrs::commands::CreateSyncJob,
        jobs::{LogLevel, SyncPhase},
        test_utils::tests::{MockStore, MockUnitOfWorkProvider},
    };

    const CSV: &[u8] = b"Sku,Available,Price\nABC-123,4,199.90\nVAR-RED-S,0,59.00\n";

    fn setup() -> (AppBus, MockStore) {
        let provider = MockUnitOfWorkProvider::new();
        let store = provider.store().clone();
        store.catalog.add_product(1, "ABC-123", &[3]);
        store.catalog.add_product(2, "SHIRT", &[3]);
        store.catalog.add_variation(5, "VAR-RED-S", 2);
        store.catalog.set_stock(5, 9);

        let bus = AppBus::new(Arc::new(Config::default()), Arc::new(provider));
        (bus, store)
    }

    async fn create(bus: &AppBus, command: CreateSyncJob) -> Result<Uuid> {
        Ok(bus
            .execute(command, CreateSyncJobCommandHandler::new())
            .await?
            .job_id)
    }

    async fn chunk(bus: &AppBus, job_id: Uuid, peek: bool) -> Result<ChunkOutcome> {
        bus.execute(RunSyncChunk { job_id, peek }, RunSyncChunkCommandHandler::new())
            .await
    }

    #[tokio::test]
    async fn test_single_chunk_completes_small_job() -> Result<()> {
        let (bus, store) = setup();
        let owner_id = Uuid::new_v4();
        let job_id = create(&bus, CreateSyncJob::new(owner_id, CSV.to_vec())).await?;

        let outcome = chunk(&bus, job_id, false).await?;

        assert!(outcome.done);
        assert_eq!(outcome.status.processed, 2);
        assert_eq!(outcome.status.updated, 2);
        assert_eq!(outcome.status.errors, 0);
        assert_eq!(outcome.log.len(), 2);
        assert_eq!(store.sync_jobs.len(), 0);

        let record = store.catalog.record(1).unwrap();
        assert_eq!(record.stock_quantity(), Some(4));
        assert_eq!(record.regular_price(), Some("199.90"));
        let variation = store.catalog.record(5).unwrap();
        assert_eq!(variation.stock_quantity(), Some(0));
        assert_eq!(variation.stock_status(), StockStatus::OutOfStock);

        let err = chunk(&bus, job_id, false).await.unwrap_err();
        assert!(err.is_job_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_peek_never_mutates() -> Result<()> {
        let (bus, store) = setup();
        let job_id = create(&bus, CreateSyncJob::new(Uuid::new_v4(), CSV.to_vec())).await?;

        let first = chunk(&bus, job_id, true).await?;
        let second = chunk(&bus, job_id, true).await?;

        assert_eq!(first, second);
        assert!(first.log.is_empty());
        assert!(!first.done);
        assert_eq!(first.status.processed, 0);
        assert_eq!(store.catalog.saves(), 0);
        assert_eq!(store.sync_jobs.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_processed_grows_chunk_by_chunk() -> Result<()> {
        let (bus, store) = setup();
        let mut csv = b"Sku,Available,Price\n".to_vec();
        for id in 10..22 {
            store.catalog.add_product(id, &format!("P-{id}"), &[]);
            csv.extend_from_slice(format!("P-{id},1,1.00\n").as_bytes());
        }
        let mut command = CreateSyncJob::new(Uuid::new_v4(), csv);
        command.chunk_size = Some(5);
        let job_id = create(&bus, command).await?;

        let mut seen = Vec::new();
        loop {
            let outcome = chunk(&bus, job_id, false).await?;
            assert!(outcome.status.processed <= outcome.status.total);
            seen.push(outcome.status.processed);
            if outcome.done {
                break;
            }
        }

        assert_eq!(seen, vec![5, 10, 12]);
        Ok(())
    }

    #[tokio::test]
    async fn test_dry_run_reports_without_writing() -> Result<()> {
        let (bus, store) = setup();
        let mut command = CreateSyncJob::new(Uuid::new_v4(), CSV.to_vec());
        command.dry_run = true;
        let job_id = create(&bus, command).await?;

        let outcome = chunk(&bus, job_id, false).await?;

        assert!(outcome.done);
        assert!(outcome.status.dry_run);
        assert_eq!(outcome.status.updated, 2);
        assert!(outcome.log.iter().all(|l| l.level == LogLevel::Dry));
        assert_eq!(store.catalog.saves(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_pre_zero_then_sync() -> Result<()> {
        let (bus, store) = setup();
        let mut command = CreateSyncJob::new(Uuid::new_v4(), CSV.to_vec());
        command.pre_zero = true;
        command.pre_zero_categories = BTreeSet::from([3]);
        let job_id = create(&bus, command).await?;

        let outcome = chunk(&bus, job_id, false).await?;
        assert_eq!(outcome.status.phase, SyncPhase::PreZero);
        assert_eq!(outcome.status.processed, 0);
        assert!(!outcome.done);
        assert_eq!(store.catalog.record(5).unwrap().stock_quantity(), Some(0));

        let outcome = chunk(&bus, job_id, false).await?;
        assert_eq!(outcome.status.phase, SyncPhase::Sync);
        assert_eq!(outcome.status.processed, 0);
        assert_eq!(outcome.log[0].level, LogLevel::Info);

        let outcome = chunk(&bus, job_id, false).await?;
        assert!(outcome.done);
        assert_eq!(outcome.status.processed, 2);
        assert_eq!(store.catalog.record(1).unwrap().stock_quantity(), Some(4));
        Ok(())
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_previous_state() -> Result<()> {
        let (bus, store) = setup();
        let mut csv = b"Sku,Available,Price\n".to_vec();
        for id in 10..20 {
            store.catalog.add_product(id, &format!("P-{id}"), &[]);
            csv.extend_from_slice(format!("P-{id},2,1.00\n").as_bytes());
        }
        let mut command = CreateSyncJob::new(Uuid::new_v4(), csv);
        command.chunk_size = Some(5);
        let job_id = create(&bus, command).await?;

        store.sync_jobs.fail_puts(true);
        let err = chunk(&bus, job_id, false).await.unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(err, ApplicationError::Db(_)));

        store.sync_jobs.fail_puts(false);
        let peeked = chunk(&bus, job_id, true).await?;
        assert_eq!(peeked.status.processed, 0);

        // Retrying replays the same chunk with the same absolute values.
        let outcome = chunk(&bus, job_id, false).await?;
        assert_eq!(outcome.status.processed, 5);
        assert_eq!(outcome.status.last_sku, "P-14");
        assert_eq!(store.catalog.record(10).unwrap().stock_quantity(), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_catalog_never_skips_tasks() -> Result<()> {
        let (bus, store) = setup();
        let mut csv = b"Sku,Available,Price\n".to_vec();
        for id in 10..16 {
            store.catalog.add_product(id, &format!("P-{id}"), &[]);
            csv.extend_from_slice(format!("P-{id},4,1.00\n").as_bytes());
        }
        let job_id = create(&bus, CreateSyncJob::new(Uuid::new_v4(), csv)).await?;

        store.catalog.disconnect_after(3);
        let err = chunk(&bus, job_id, false).await.unwrap_err();
        assert!(err.is_transient());

        let peeked = chunk(&bus, job_id, true).await?;
        assert_eq!(peeked.status.processed, 0);
        assert_eq!(peeked.status.errors, 0);

        store.catalog.reconnect();
        let outcome = chunk(&bus, job_id, false).await?;
        assert!(outcome.done);
        assert_eq!(outcome.status.updated, 6);
        assert_eq!(outcome.status.errors, 0);
        for id in 10..16 {
            assert_eq!(store.catalog.record(id).unwrap().stock_quantity(), Some(4));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_job_is_not_found() -> Result<()> {
        let (bus, store) = setup();
        let job_id = create(&bus, CreateSyncJob::new(Uuid::new_v4(), CSV.to_vec())).await?;
        store.sync_jobs.expire(job_id);

        let err = chunk(&bus, job_id, true).await.unwrap_err();
        assert!(err.is_job_not_found());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_job_finishes_on_first_chunk() -> Result<()> {
        let (bus, store) = setup();
        let owner_id = Uuid::new_v4();
        let csv = b"Sku,Available,Price\nNOPE,1,1\n".to_vec();
        let job_id = create(&bus, CreateSyncJob::new(owner_id, csv)).await?;

        let outcome = chunk(&bus, job_id, false).await?;

        assert!(outcome.done);
        assert_eq!(outcome.status.missing, 1);
        assert!(outcome.log.is_empty());
        assert_eq!(store.sync_jobs.len(), 0);
        Ok(())
    }
}
