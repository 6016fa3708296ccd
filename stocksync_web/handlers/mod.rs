mod helpers;
mod settings_handler;
mod sync_job_handler;
mod upload_form;

pub(crate) use helpers::*;
pub use settings_handler::price_adjust_defaults;
pub use sync_job_handler::{
    ChunkRequest, cancel_sync_job, create_sync_job, resume_sync_job, run_sync_chunk,
};
