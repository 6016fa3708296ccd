use serde::{Deserialize, Serialize};

use crate::jobs::{LogLine, SyncJob, SyncPhase};

/// Externally visible snapshot of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub processed: usize,
    pub total: usize,
    pub updated: usize,
    pub missing: usize,
    pub errors: usize,
    pub dry_run: bool,
    pub phase: SyncPhase,
    pub last_sku: String,
}

impl From<&SyncJob> for SyncStatus {
    fn from(job: &SyncJob) -> Self {
        Self {
            processed: job.processed,
            total: job.total,
            updated: job.updated,
            missing: job.missing,
            errors: job.errors,
            dry_run: job.dry_run,
            phase: job.phase,
            last_sku: job.last_sku.clone(),
        }
    }
}

/// Result of one chunk invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkOutcome {
    pub status: SyncStatus,
    /// Lines produced by this invocation only.
    pub log: Vec<LogLine>,
    /// True once the job finished and its document was removed.
    pub done: bool,
}

impl ChunkOutcome {
    pub fn peek(job: &SyncJob) -> Self {
        Self {
            status: job.into(),
            log: Vec::new(),
            done: false,
        }
    }
}
