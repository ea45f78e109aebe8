use thiserror::Error;

/// Errors that can occur while storing an uploaded file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The target name is not a single, plain file name.
    #[error("invalid upload filename: {0:?}")]
    InvalidFilename(String),
    /// The upload exceeds the configured size limit.
    #[error("upload exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
