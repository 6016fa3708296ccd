mod cancel_sync_job;
mod create_sync_job;
mod helpers;
mod run_sync_chunk;

pub use cancel_sync_job::CancelSyncJobCommandHandler;
pub use create_sync_job::CreateSyncJobCommandHandler;
pub use run_sync_chunk::RunSyncChunkCommandHandler;
