//! Concurrency tests against a real Postgres.
//!
//! Run with `TEST_DATABASE_URL` pointing at a migrated database and
//! `cargo test -- --ignored`.

#[cfg(test)]
pub mod tests {
    use std::{
        sync::Arc,
        time::{Duration, Instant},
    };
    use uuid::Uuid;

    use stocksync_app::{
        app::AppBus,
        command_handlers::{CreateSyncJobCommandHandler, RunSyncChunkCommandHandler},
        config::Config,
        cqrs::commands::{CreateSyncJob, RunSyncChunk},
        jobs::{SyncJob, SyncJobOptions, SyncTask},
        uow::UnitOfWorkProvider,
    };
    use stocksync_db::{
        DbPool, establish_test_catalog_pool, establish_test_connection_pool,
        uow::PostgresUnitOfWorkProvider,
    };
    use stocksync_types::{
        Result,
        catalog::{RecordKind, ResolvedSku},
        errors::ApplicationError,
    };

    async fn provider() -> Result<(PostgresUnitOfWorkProvider, DbPool)> {
        let pool = establish_test_connection_pool().await?;
        let catalog_pool = establish_test_catalog_pool().await?;
        Ok((
            PostgresUnitOfWorkProvider::new(pool.clone(), catalog_pool),
            pool,
        ))
    }

    fn unique_base() -> i64 {
        8_000_000 + (Uuid::new_v4().as_u128() % 100_000) as i64 * 100
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore]
    async fn test_concurrent_chunks_fill_the_pool_without_losing_writes() -> Result<()> {
        let (provider, pool) = provider().await?;
        let jobs = pool.options().get_max_connections() as i64;
        let base = unique_base();

        for i in 0..jobs {
            sqlx::query("INSERT INTO catalog_records (id, sku, kind) VALUES ($1, $2, 'Product')")
                .bind(base + i)
                .bind(format!("CONC-{base}-{i}"))
                .execute(&pool)
                .await
                .unwrap();
        }

        let bus = Arc::new(AppBus::new(
            Arc::new(Config::default()),
            Arc::new(provider),
        ));
        let mut job_ids = Vec::new();
        for i in 0..jobs {
            let csv = format!("Sku,Available,Price\nCONC-{base}-{i},7,12.00\n");
            let created = bus
                .execute(
                    CreateSyncJob::new(Uuid::new_v4(), csv.into_bytes()),
                    CreateSyncJobCommandHandler::new(),
                )
                .await?;
            job_ids.push(created.job_id);
        }

        let started = Instant::now();
        let handles: Vec<_> = job_ids
            .into_iter()
            .map(|job_id| {
                let bus = bus.clone();
                tokio::spawn(async move {
                    bus.execute(
                        RunSyncChunk {
                            job_id,
                            peek: false,
                        },
                        RunSyncChunkCommandHandler::new(),
                    )
                    .await
                })
            })
            .collect();

        for handle in handles {
            let outcome = handle.await.unwrap()?;
            assert!(outcome.done);
            assert_eq!(outcome.status.updated, 1);
            assert_eq!(outcome.status.errors, 0, "{:?}", outcome.log);
        }
        assert!(started.elapsed() < Duration::from_secs(5));

        let written: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM catalog_records WHERE id BETWEEN $1 AND $2 AND stock_quantity = 7",
        )
        .bind(base)
        .bind(base + jobs - 1)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(written, jobs);

        sqlx::query("DELETE FROM catalog_records WHERE id BETWEEN $1 AND $2")
            .bind(base)
            .bind(base + jobs - 1)
            .execute(&pool)
            .await
            .unwrap();
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[ignore]
    async fn test_locked_job_waits_for_first_commit() -> Result<()> {
        let (provider, _pool) = provider().await?;
        let ttl = chrono::Duration::minutes(30);

        let task = SyncTask::new(
            "LOCK-1",
            ResolvedSku {
                record_id: 1,
                kind: RecordKind::Product,
                parent_id: 0,
            },
            1,
            "1.00",
            "1.00",
        );
        let job = SyncJob::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![task],
            0,
            SyncJobOptions {
                chunk_size: 5,
                ..Default::default()
            },
        );
        let setup = provider.tx().await?;
        setup.sync_jobs().put(&job, ttl).await?;
        setup.commit().await?;

        let first = provider.tx().await?;
        let mut locked = first.sync_jobs().get_for_update(job.id).await?.unwrap();

        let second_provider = provider.clone();
        let job_id = job.id;
        let second = tokio::spawn(async move {
            let uow = second_provider.tx().await?;
            let seen = uow.sync_jobs().get_for_update(job_id).await?;
            uow.rollback().await?;
            Ok::<_, ApplicationError>(seen)
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!second.is_finished());

        locked.mark_processed("LOCK-1");
        first.sync_jobs().put(&locked, ttl).await?;
        first.commit().await?;

        let seen = second.await.unwrap()?.unwrap();
        assert_eq!(seen.processed, 1);

        let cleanup = provider.tx().await?;
        cleanup.sync_jobs().delete(job.id).await?;
        cleanup.commit().await?;
        Ok(())
    }
}
