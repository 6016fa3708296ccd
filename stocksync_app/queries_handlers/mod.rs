mod get_price_adjust_defaults;
mod get_resumable_sync_job;

pub use get_price_adjust_defaults::GetPriceAdjustDefaultsHandler;
pub use get_resumable_sync_job::GetResumableSyncJobHandler;
