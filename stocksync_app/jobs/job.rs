use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::{config::clamp_chunk_size, jobs::SyncTask};

/// Error messages kept on the job document. Further errors are only counted.
pub const MAX_ERROR_MESSAGES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncPhase {
    PreZero,
    Sync,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreZero {
    pub enabled: bool,
    pub category_ids: BTreeSet<i64>,
    /// Number of products already walked through.
    pub offset: usize,
    pub done: bool,
    pub done_at: Option<DateTime<Utc>>,
    /// Products zeroed so far (or that would have been, on dry runs).
    pub zeroed: usize,
}

/// Creation options of a job, as chosen by the caller.
#[derive(Debug, Clone, Default)]
pub struct SyncJobOptions {
    pub dry_run: bool,
    pub chunk_size: usize,
    pub pre_zero: bool,
    pub pre_zero_categories: BTreeSet<i64>,
}

/// A bulk stock/price sync, advanced one chunk at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncJob {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub dry_run: bool,
    pub chunk_size: usize,
    pub phase: SyncPhase,
    pub pre_zero: PreZero,
    tasks: Vec<SyncTask>,
    pub total: usize,
    pub processed: usize,
    pub updated: usize,
    pub missing: usize,
    pub errors: usize,
    pub error_messages: Vec<String>,
    pub last_sku: String,
}

impl SyncJob {
    pub fn new(
        id: Uuid,
        owner_id: Uuid,
        tasks: Vec<SyncTask>,
        missing: usize,
        options: SyncJobOptions,
    ) -> Self {
        // Pre-zero without categories would zero the whole catalog.
        let pre_zero_enabled = options.pre_zero && !options.pre_zero_categories.is_empty();
        let phase = if pre_zero_enabled {
            SyncPhase::PreZero
        } else {
            SyncPhase::Sync
        };

        Self {
            id,
            owner_id,
            created_at: Utc::now(),
            dry_run: options.dry_run,
            chunk_size: clamp_chunk_size(options.chunk_size),
            phase,
            pre_zero: PreZero {
                enabled: pre_zero_enabled,
                category_ids: if pre_zero_enabled {
                    options.pre_zero_categories
                } else {
                    BTreeSet::new()
                },
                ..Default::default()
            },
            total: tasks.len(),
            tasks,
            processed: 0,
            updated: 0,
            missing,
            errors: 0,
            error_messages: Vec::new(),
            last_sku: String::new(),
        }
    }

    pub fn tasks(&self) -> &[SyncTask] {
        &self.tasks
    }

    /// Tasks of the next chunk, in their original order.
    pub fn next_chunk(&self) -> &[SyncTask] {
        let start = self.processed.min(self.total);
        let end = (start + self.chunk_size).min(self.total);
        &self.tasks[start..end]
    }

    /// All tasks processed while in the sync phase.
    pub fn is_complete(&self) -> bool {
        self.phase == SyncPhase::Sync && self.processed >= self.total
    }

    /// Moves to the sync phase. There is no way back.
    pub fn enter_sync(&mut self) {
        self.phase = SyncPhase::Sync;
    }

    pub fn finish_pre_zero(&mut self, at: DateTime<Utc>) {
        self.pre_zero.done = true;
        self.pre_zero.done_at = Some(at);
        self.enter_sync();
    }

    /// Counts an error and keeps its message while there is room.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors += 1;
        if self.error_messages.len() < MAX_ERROR_MESSAGES {
            self.error_messages.push(message.into());
        }
    }

    pub fn mark_processed(&mut self, sku: &str) {
        if self.processed < self.total {
            self.processed += 1;
        }
        self.last_sku = sku.to_string();
    }
}
