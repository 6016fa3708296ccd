use thiserror::Error;

/// Errors raised while reading an uploaded stock CSV. Any of them aborts job
/// creation before the catalog is touched.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("The uploaded file contains no usable rows")]
    EmptyInput,

    #[error("The uploaded file cannot be read: {0}")]
    UnreadableInput(String),
}
