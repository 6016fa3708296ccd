use thiserror::Error;
use uuid::Uuid;

/// Errors for app logic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Caller is not allowed to administer commerce data")]
    Forbidden,

    #[error("Sync job {0} not found or expired")]
    SyncJobNotFound(Uuid),

    #[error("Invalid category id '{0}'")]
    InvalidCategoryId(String),

    #[error("Invalid price adjustment '{0}'")]
    InvalidPriceAdjust(String),

    #[error(transparent)]
    TokenHash(#[from] argon2::password_hash::Error),
}
