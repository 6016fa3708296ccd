use thiserror::Error;

mod app_error;
mod catalog_error;
mod db_error;
mod ingest_error;

pub use app_error::AppError;
pub use catalog_error::CatalogError;
pub use db_error::DbError;
pub use ingest_error::IngestError;

pub type Result<T, E = ApplicationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl ApplicationError {
    /// Storage that could not be reached or did not commit. The job is left
    /// untouched, so the same chunk can be requested again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApplicationError::Db(DbError::Database(_) | DbError::Transaction(_))
                | ApplicationError::Infrastructure(_)
        )
    }

    /// True when the job id no longer exists (finished, cancelled or expired).
    pub fn is_job_not_found(&self) -> bool {
        matches!(self, ApplicationError::App(AppError::SyncJobNotFound(_)))
    }
}

impl From<anyhow::Error> for ApplicationError {
    fn from(err: anyhow::Error) -> Self {
        ApplicationError::Unknown(err.to_string())
    }
}
