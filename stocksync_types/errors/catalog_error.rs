use thiserror::Error;

/// Errors for catalog mutations. The chunk executor recovers from these
/// per record.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog record #{0} not found")]
    RecordNotFound(i64),

    #[error("Failed to write catalog record #{id}: {reason}")]
    WriteFailure { id: i64, reason: String },
}
