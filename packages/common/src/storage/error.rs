use thiserror::Error;

use super::id::FileId;

/// Errors that can occur during chunked blob storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No finalized file record exists for the id.
    #[error("file not found: {0}")]
    NotFound(FileId),

    /// The provided file id could not be parsed.
    #[error("invalid file id: {0}")]
    InvalidId(String),

    /// Persisting a chunk or file record failed.
    #[error("storage write failed: {0}")]
    Write(String),

    /// Reading a chunk or file record failed.
    #[error("storage read failed: {0}")]
    Read(String),

    /// A finalized file is missing one of its chunks.
    #[error("file {file_id} is missing chunk {index}")]
    MissingChunk { file_id: FileId, index: u32 },

    /// Stored chunks do not add up to the recorded length.
    #[error("corrupt file: {0}")]
    Corrupt(String),

    /// The upload exceeds the configured size limit.
    #[error("file exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
