use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::error::StorageError;
use super::hash::ContentHasher;
use super::id::FileId;
use super::model::{Chunk, FileHandle, FileRecord};
use super::traits::ChunkBackend;

/// Write side of a single file upload.
///
/// Bytes are partitioned into fixed-size chunks that are persisted as soon as
/// they fill. The file record is only inserted by [`finish`](Self::finish), so
/// an upload that is dropped midway leaves chunks without a record. Those are
/// garbage, reported by `orphaned_chunk_owners`, never a live file.
///
/// Once a chunk write fails the stream is poisoned: further writes and
/// `finish` return `Write`, and only [`abort`](Self::abort) is useful.
pub struct UploadStream {
    backend: Arc<dyn ChunkBackend>,
    id: FileId,
    name: String,
    content_type: String,
    chunk_size: usize,
    max_size: u64,
    buffer: Vec<u8>,
    next_index: u32,
    length: u64,
    hasher: ContentHasher,
    failed: bool,
}

impl UploadStream {
    pub(super) fn new(
        backend: Arc<dyn ChunkBackend>,
        name: &str,
        content_type: &str,
        chunk_size: u32,
        max_size: u64,
    ) -> Self {
        let chunk_size = chunk_size.max(1) as usize;
        // Every chunk index must fit in a u32.
        let max_size = max_size.min(u64::from(u32::MAX) * chunk_size as u64);
        Self {
            backend,
            id: FileId::new(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            chunk_size,
            max_size,
            buffer: Vec::with_capacity(chunk_size),
            next_index: 0,
            length: 0,
            hasher: ContentHasher::default(),
            failed: false,
        }
    }

    /// Id the file will be finalized under.
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Append bytes, persisting every chunk that fills up.
    pub async fn write(&mut self, mut data: &[u8]) -> Result<(), StorageError> {
        self.ensure_usable()?;
        let total = self.length + data.len() as u64;
        if total > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: total,
                limit: self.max_size,
            });
        }
        self.length = total;
        self.hasher.update(data);

        while !data.is_empty() {
            let room = self.chunk_size - self.buffer.len();
            let take = room.min(data.len());
            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.buffer.len() == self.chunk_size {
                self.flush_chunk().await?;
            }
        }
        Ok(())
    }

    fn ensure_usable(&self) -> Result<(), StorageError> {
        if self.failed {
            return Err(StorageError::Write(format!(
                "upload {} lost a chunk and cannot continue",
                self.id
            )));
        }
        Ok(())
    }

    async fn flush_chunk(&mut self) -> Result<(), StorageError> {
        let data = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.chunk_size));
        let result = self
            .backend
            .insert_chunk(Chunk {
                file_id: self.id,
                index: self.next_index,
                data,
            })
            .await;
        if let Err(e) = result {
            self.failed = true;
            return Err(e);
        }
        self.next_index += 1;
        Ok(())
    }

    /// Persist the trailing partial chunk and insert the file record.
    pub async fn finish(mut self) -> Result<FileHandle, StorageError> {
        self.ensure_usable()?;
        if !self.buffer.is_empty() {
            self.flush_chunk().await?;
        }

        let record = FileRecord {
            id: self.id,
            name: self.name,
            content_type: self.content_type,
            length: self.length,
            chunk_size: self.chunk_size as u32,
            content_hash: self.hasher.finalize(),
            uploaded_at: Utc::now(),
        };
        let handle = record.handle();
        self.backend.insert_file(record).await?;

        debug!(
            file_id = %handle.id,
            length = self.length,
            chunks = self.next_index,
            "Upload finalized"
        );
        Ok(handle)
    }

    /// Discard the upload, removing any chunks already persisted.
    pub async fn abort(self) -> Result<u64, StorageError> {
        self.backend.delete_chunks(self.id).await
    }
}
