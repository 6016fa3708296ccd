use std::sync::Arc;

use stocksync_types::Result;

use crate::{
    command_handlers::helpers::forget_if_last_job,
    config::Config,
    cqrs::{CommandHandler, commands::CancelSyncJob},
    uow::UnitOfWork,
};

/// Deletes the job document whatever its state. A chunk already running for
/// the job finishes first, the next one finds nothing.
pub struct CancelSyncJobCommandHandler {}

impl Default for CancelSyncJobCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSyncJobCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<CancelSyncJob> for CancelSyncJobCommandHandler {
    async fn handle(
        &self,
        command: CancelSyncJob,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<()> {
        uow.sync_jobs().delete(command.job_id).await?;
        forget_if_last_job(uow, command.owner_id, command.job_id).await?;

        tracing::info!(job_id = %command.job_id, owner_id = %command.owner_id, "Sync job cancelled");
        Ok(())
    }
}
