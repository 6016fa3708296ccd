use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stocksync_types::pricing::PriceAdjust;

use crate::{cqrs::Query, jobs::SyncStatus};

/// The last job an owner started, if it is still alive.
pub struct GetResumableSyncJob {
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumableSyncJob {
    pub job_id: Uuid,
    pub status: SyncStatus,
}

impl Query for GetResumableSyncJob {
    type Output = Option<ResumableSyncJob>;
}

/// Saved price adjustment, or the neutral one when nothing was saved.
pub struct GetPriceAdjustDefaults;

impl Query for GetPriceAdjustDefaults {
    type Output = PriceAdjust;
}
