use qphotos_types::TextError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid storage root: {0}")]
    InvalidRootDirectory(String),
    #[error("path escapes the storage root")]
    Forbidden,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    Conflict(String),
    #[error("annotation failed: {0}")]
    Annotation(Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write photo file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read from storage: {0}")]
    FileRead(std::io::Error),
    #[error("failed to rename entry: {0}")]
    Rename(std::io::Error),
    #[error("failed to remove entry: {0}")]
    Remove(std::io::Error),
    #[error("failed to access last project file: {0}")]
    LastProject(std::io::Error),
}

impl From<TextError> for StoreError {
    fn from(err: TextError) -> Self {
        StoreError::InvalidInput(err.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
