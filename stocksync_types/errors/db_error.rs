use thiserror::Error;

/// Errors for db stuff.
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}
