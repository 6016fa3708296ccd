use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use stocksync_types::pricing::PriceRounding;

use crate::{
    cqrs::Command,
    jobs::{ChunkOutcome, SyncStatus},
};

/// Ingests an uploaded CSV and stores a new sync job for `owner_id`.
#[derive(Debug, Clone)]
pub struct CreateSyncJob {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub csv: Vec<u8>,
    /// Falls back to the configured default when absent.
    pub chunk_size: Option<usize>,
    pub dry_run: bool,
    pub pre_zero: bool,
    pub pre_zero_categories: BTreeSet<i64>,
    /// Per-submission overrides of the saved price adjustment.
    pub price_adjust_amount: Option<f64>,
    pub price_adjust_round: Option<PriceRounding>,
    pub save_price_adjust: bool,
}

impl CreateSyncJob {
    pub fn new(owner_id: Uuid, csv: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            csv,
            chunk_size: None,
            dry_run: false,
            pre_zero: false,
            pre_zero_categories: BTreeSet::new(),
            price_adjust_amount: None,
            price_adjust_round: None,
            save_price_adjust: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSyncJob {
    pub job_id: Uuid,
    pub status: SyncStatus,
}

impl Command for CreateSyncJob {
    type Output = CreatedSyncJob;
}

/// Advances a job by one chunk, or only reports its status when `peek` is set.
#[derive(Debug, Clone)]
pub struct RunSyncChunk {
    pub job_id: Uuid,
    pub peek: bool,
}

impl Command for RunSyncChunk {
    type Output = ChunkOutcome;
}

/// Drops a job between two chunks.
#[derive(Debug, Clone)]
pub struct CancelSyncJob {
    pub owner_id: Uuid,
    pub job_id: Uuid,
}

impl Command for CancelSyncJob {
    type Output = ();
}
