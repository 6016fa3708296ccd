use serde::{Deserialize, Serialize};

use stocksync_types::catalog::{RecordKind, ResolvedSku};

/// One resolved unit of sync work: set this record's stock and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTask {
    pub sku: String,
    pub record_id: i64,
    pub record_kind: RecordKind,
    pub parent_id: i64,
    pub target_qty: i64,
    /// Adjusted price, always two decimals.
    pub target_price: String,
    /// Price as read from the CSV, before adjustment.
    pub original_price: String,
}

impl SyncTask {
    pub fn new(
        sku: impl Into<String>,
        resolved: ResolvedSku,
        target_qty: i64,
        target_price: impl Into<String>,
        original_price: impl Into<String>,
    ) -> Self {
        Self {
            sku: sku.into(),
            record_id: resolved.record_id,
            record_kind: resolved.kind,
            parent_id: resolved.parent_id,
            target_qty,
            target_price: target_price.into(),
            original_price: original_price.into(),
        }
    }
}
