use chrono::Utc;
use std::sync::Arc;

use stocksync_types::{
    catalog::{CatalogRecord, StockStatus},
    errors::{ApplicationError, CatalogError},
};

use crate::{
    jobs::{LogLine, SyncJob, SyncPhase, SyncTask},
    repository::CatalogRepository,
};

/// Advances a job by one bounded unit of work against the catalog.
///
/// The executor only mutates the in-memory document; loading, persisting and
/// deleting it is up to the caller. Failures on single records are counted on
/// the job and reported as log lines. Transient storage errors abort the
/// chunk instead, so the caller discards it and the same chunk runs again.
pub struct ChunkExecutor<'a> {
    catalog: Arc<dyn CatalogRepository + 'a>,
}

impl<'a> ChunkExecutor<'a> {
    pub fn new(catalog: Arc<dyn CatalogRepository + 'a>) -> Self {
        Self { catalog }
    }

    /// Runs the next chunk of the current phase and returns its log lines.
    ///
    /// A finished pre-zero phase switches the job to `Sync`, but sync tasks
    /// only start on the following call.
    pub async fn advance(&self, job: &mut SyncJob) -> Result<Vec<LogLine>, ApplicationError> {
        let mut log = Vec::new();
        match job.phase {
            SyncPhase::PreZero => self.advance_pre_zero(job, &mut log).await?,
            SyncPhase::Sync => self.advance_sync(job, &mut log).await?,
        }
        Ok(log)
    }

    async fn advance_pre_zero(
        &self,
        job: &mut SyncJob,
        log: &mut Vec<LogLine>,
    ) -> Result<(), ApplicationError> {
        if job.pre_zero.category_ids.is_empty() {
            tracing::warn!(job_id = %job.id, "Pre-zero without categories, switching to sync");
            job.enter_sync();
            log.push(LogLine::warn(
                "Pre-zero has no categories selected, skipping to stock sync",
            ));
            return Ok(());
        }

        let categories: Vec<i64> = job.pre_zero.category_ids.iter().copied().collect();
        let product_ids = self
            .catalog
            .list_product_ids_in_categories(&categories, job.chunk_size, job.pre_zero.offset)
            .await?;

        if product_ids.is_empty() {
            job.finish_pre_zero(Utc::now());
            tracing::info!(job_id = %job.id, zeroed = job.pre_zero.zeroed, "Pre-zero finished");
            let verb = if job.dry_run { "would be" } else { "were" };
            log.push(LogLine::info(format!(
                "Pre-zero finished: {} products {verb} set to 0, starting stock sync",
                job.pre_zero.zeroed
            )));
            return Ok(());
        }

        tracing::debug!(
            job_id = %job.id,
            offset = job.pre_zero.offset,
            count = product_ids.len(),
            "Pre-zero chunk"
        );

        for product_id in &product_ids {
            match self.zero_product(*product_id, job.dry_run).await {
                Ok(variations) => {
                    job.pre_zero.zeroed += 1;
                    log.push(pre_zero_line(*product_id, variations, job.dry_run));
                }
                Err(e) if e.is_transient() => return Err(e),
                Err(e) => {
                    tracing::warn!(job_id = %job.id, product_id, "Pre-zero failed: {e}");
                    let message = format!("Pre-zero #{product_id}: {e}");
                    log.push(LogLine::error(message.clone()));
                    job.record_error(message);
                }
            }
        }

        job.pre_zero.offset += product_ids.len();
        Ok(())
    }

    /// Zeroes a product, or all of its variations when it has any. Returns
    /// the number of variations touched.
    async fn zero_product(&self, product_id: i64, dry_run: bool) -> Result<usize, ApplicationError> {
        let children = self.catalog.children_of(product_id).await?;
        if dry_run {
            return Ok(children.len());
        }

        let mut product = self.load(product_id).await?;
        if children.is_empty() {
            product.zero_stock();
        } else {
            for child_id in &children {
                let mut variation = self.load(*child_id).await?;
                variation.zero_stock();
                self.catalog.save_record(&variation).await?;
            }
            product.set_status(StockStatus::OutOfStock);
        }
        self.catalog.save_record(&product).await?;

        Ok(children.len())
    }

    async fn advance_sync(
        &self,
        job: &mut SyncJob,
        log: &mut Vec<LogLine>,
    ) -> Result<(), ApplicationError> {
        let chunk: Vec<SyncTask> = job.next_chunk().to_vec();
        tracing::debug!(
            job_id = %job.id,
            from = job.processed,
            count = chunk.len(),
            total = job.total,
            "Sync chunk"
        );

        for task in &chunk {
            if job.dry_run {
                job.updated += 1;
                log.push(LogLine::dry(format!(
                    "{} (#{}): qty -> {}, price {} -> {}",
                    task.sku, task.record_id, task.target_qty, task.original_price, task.target_price
                )));
            } else {
                match self.apply_task(task).await {
                    Ok(()) => {
                        job.updated += 1;
                        log.push(LogLine::ok(format!(
                            "{} (#{}): qty = {}, price = {}",
                            task.sku, task.record_id, task.target_qty, task.target_price
                        )));
                    }
                    Err(e) if e.is_transient() => return Err(e),
                    Err(e) => {
                        tracing::warn!(job_id = %job.id, sku = %task.sku, "Sync failed: {e}");
                        let message = format!("{}: {e}", task.sku);
                        log.push(LogLine::error(message.clone()));
                        job.record_error(message);
                    }
                }
            }

            job.mark_processed(&task.sku);
        }
        Ok(())
    }

    async fn apply_task(&self, task: &SyncTask) -> Result<(), ApplicationError> {
        let mut record = self.load(task.record_id).await?;
        record.set_managed_stock(true);
        record.set_quantity(task.target_qty);
        record.set_status(StockStatus::for_quantity(task.target_qty));
        record.set_regular_price(task.target_price.clone());
        self.catalog.save_record(&record).await
    }

    async fn load(&self, id: i64) -> Result<CatalogRecord, ApplicationError> {
        self.catalog
            .get_record(id)
            .await?
            .ok_or(ApplicationError::Catalog(CatalogError::RecordNotFound(id)))
    }
}

fn pre_zero_line(product_id: i64, variations: usize, dry_run: bool) -> LogLine {
    match (dry_run, variations) {
        (true, 0) => LogLine::dry(format!("Pre-zero #{product_id}: stock would be set to 0")),
        (true, n) => LogLine::dry(format!(
            "Pre-zero #{product_id}: {n} variations would be set to 0"
        )),
        (false, 0) => LogLine::ok(format!("Pre-zero #{product_id}: stock set to 0")),
        (false, n) => LogLine::ok(format!(
            "Pre-zero #{product_id}: {n} variations set to 0, product out of stock"
        )),
    }
}
