use chrono::Duration;
use std::sync::Arc;

use stocksync_types::{Result, errors::AppError};

use crate::{
    config::Config,
    cqrs::{
        CommandHandler,
        commands::{CreateSyncJob, CreatedSyncJob},
    },
    ingest::{format_price, read_stock_csv},
    jobs::{SyncJob, SyncJobOptions, SyncTask},
    pricing::{adjust_price, resolve_price_adjust},
    resolver::resolve_skus,
    uow::UnitOfWork,
};

pub struct CreateSyncJobCommandHandler {}

impl Default for CreateSyncJobCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateSyncJobCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<CreateSyncJob> for CreateSyncJobCommandHandler {
    async fn handle(
        &self,
        command: CreateSyncJob,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<CreatedSyncJob> {
        let rows = read_stock_csv(&command.csv)?;

        let settings = uow.settings();
        let saved = settings.load_price_adjust().await?;
        let adjust = resolve_price_adjust(
            command.price_adjust_amount,
            command.price_adjust_round,
            saved,
        );
        if !adjust.amount.is_finite() {
            return Err(AppError::InvalidPriceAdjust(adjust.amount.to_string()).into());
        }
        if command.save_price_adjust {
            settings.save_price_adjust(&adjust).await?;
        }

        let skus: Vec<String> = rows.keys().cloned().collect();
        let catalog = uow.catalog();
        let resolved = resolve_skus(catalog.as_ref(), &skus, config.resolve_batch_size).await?;

        let mut tasks = Vec::with_capacity(resolved.len());
        let mut missing = 0;
        for row in rows.values() {
            match resolved.get(&row.sku) {
                Some(target) => tasks.push(SyncTask::new(
                    row.sku.clone(),
                    *target,
                    row.available,
                    adjust_price(row.price, &adjust),
                    format_price(row.price),
                )),
                None => {
                    tracing::debug!(sku = %row.sku, "SKU not found in catalog");
                    missing += 1;
                }
            }
        }

        let job = SyncJob::new(
            command.id,
            command.owner_id,
            tasks,
            missing,
            SyncJobOptions {
                dry_run: command.dry_run,
                chunk_size: command.chunk_size.unwrap_or(config.default_chunk_size),
                pre_zero: command.pre_zero,
                pre_zero_categories: command.pre_zero_categories,
            },
        );

        let ttl = Duration::seconds(config.job_ttl_secs);
        uow.sync_jobs().put(&job, ttl).await?;
        uow.owners()
            .remember_last_job(job.owner_id, job.id, ttl)
            .await?;

        tracing::info!(
            job_id = %job.id,
            owner_id = %job.owner_id,
            total = job.total,
            missing = job.missing,
            dry_run = job.dry_run,
            phase = ?job.phase,
            "Sync job created"
        );

        Ok(CreatedSyncJob {
            job_id: job.id,
            status: (&job).into(),
        })
    }
}
