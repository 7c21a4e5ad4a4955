use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};

use super::error::StorageError;
use super::hash::ContentHash;
use super::id::FileId;

/// Default chunk size: 255 KiB, so a chunk row plus its key stays under 256 KiB.
pub const DEFAULT_CHUNK_SIZE: u32 = 255 * 1024;

/// Metadata row describing one finalized blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    /// Original filename. Display only, never used for lookup.
    pub name: String,
    pub content_type: String,
    pub length: u64,
    pub chunk_size: u32,
    pub content_hash: ContentHash,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Number of chunks a finalized file of this length occupies.
    ///
    /// A count that does not fit a chunk index means the record is corrupt.
    pub fn chunk_count(&self) -> Result<u32, StorageError> {
        if self.chunk_size == 0 {
            return Ok(0);
        }
        let count = self.length.div_ceil(u64::from(self.chunk_size));
        u32::try_from(count).map_err(|_| {
            StorageError::Corrupt(format!(
                "file {} records {} bytes, more than {} chunks of {} bytes",
                self.id,
                self.length,
                u32::MAX,
                self.chunk_size
            ))
        })
    }

    pub fn handle(&self) -> FileHandle {
        FileHandle {
            id: self.id,
            name: self.name.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

/// One ordered segment of a blob's bytes, keyed by `(file_id, index)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub file_id: FileId,
    pub index: u32,
    pub data: Vec<u8>,
}

/// Caller-facing identity of an uploaded blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub id: FileId,
    pub name: String,
    pub content_type: String,
}

/// Lazy, forward-only sequence of chunk payloads in index order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, StorageError>> + Send>>;

/// An opened download: the resolved record plus its content stream.
pub struct Download {
    pub record: FileRecord,
    pub stream: ChunkStream,
}

impl Download {
    pub fn content_type(&self) -> &str {
        &self.record.content_type
    }
}
