use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::download::chunk_stream;
use super::error::StorageError;
use super::id::FileId;
use super::model::{DEFAULT_CHUNK_SIZE, Download, FileHandle, FileRecord};
use super::traits::{BlobStore, BoxReader, ChunkBackend};
use super::upload::UploadStream;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Chunked file store in the style of a GridFS bucket.
///
/// Every file is a record plus `ceil(length / chunk_size)` chunks keyed by
/// `(file_id, index)`. Chunks are written before the record and deleted after
/// it, so a record that is visible always has its chunks behind it.
#[derive(Clone)]
pub struct ChunkStore {
    backend: Arc<dyn ChunkBackend>,
    chunk_size: u32,
    max_file_size: u64,
}

impl ChunkStore {
    pub fn new(backend: Arc<dyn ChunkBackend>) -> Self {
        Self {
            backend,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_file_size: u64::MAX,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Allocate a new file id and open its write side.
    pub fn create_upload_stream(&self, name: &str, content_type: &str) -> UploadStream {
        UploadStream::new(
            self.backend.clone(),
            name,
            content_type,
            self.chunk_size,
            self.max_file_size,
        )
    }

    /// Resolve the record, then hand out a lazy stream over its chunks.
    pub async fn open_download_stream(&self, id: FileId) -> Result<Download, StorageError> {
        let record = self
            .backend
            .find_file(id)
            .await?
            .ok_or(StorageError::NotFound(id))?;
        let stream = chunk_stream(self.backend.clone(), record.clone())?;
        Ok(Download { record, stream })
    }

    /// Delete the record first, then its chunks.
    ///
    /// A missing record still triggers chunk cleanup so leftovers from an
    /// interrupted upload are reclaimed, but the call reports `NotFound`.
    pub async fn delete_file(&self, id: FileId) -> Result<(), StorageError> {
        let existed = self.backend.delete_file(id).await?;

        if !existed {
            match self.backend.delete_chunks(id).await {
                Ok(0) => {}
                Ok(removed) => debug!(file_id = %id, removed, "Purged chunks of unrecorded file"),
                Err(e) => warn!(file_id = %id, error = %e, "Orphan chunk cleanup failed"),
            }
            return Err(StorageError::NotFound(id));
        }

        let removed = self.backend.delete_chunks(id).await?;
        debug!(file_id = %id, removed, "File deleted");
        Ok(())
    }
}

async fn discard(upload: UploadStream) {
    let id = upload.id();
    if let Err(e) = upload.abort().await {
        warn!(file_id = %id, error = %e, "Failed to discard partial upload");
    }
}

#[async_trait]
impl BlobStore for ChunkStore {
    async fn upload_stream(
        &self,
        mut reader: BoxReader,
        name: &str,
        content_type: &str,
    ) -> Result<FileHandle, StorageError> {
        let mut upload = self.create_upload_stream(name, content_type);
        let mut buf = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    discard(upload).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }
            if let Err(e) = upload.write(&buf[..n]).await {
                discard(upload).await;
                return Err(e);
            }
        }

        let id = upload.id();
        match upload.finish().await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                if let Err(cleanup) = self.backend.delete_chunks(id).await {
                    warn!(file_id = %id, error = %cleanup, "Failed to discard partial upload");
                }
                Err(e)
            }
        }
    }

    async fn stat(&self, id: FileId) -> Result<FileRecord, StorageError> {
        self.backend
            .find_file(id)
            .await?
            .ok_or(StorageError::NotFound(id))
    }

    async fn download(&self, id: FileId) -> Result<Download, StorageError> {
        self.open_download_stream(id).await
    }

    async fn delete_file(&self, id: FileId) -> Result<(), StorageError> {
        ChunkStore::delete_file(self, id).await
    }

    async fn orphaned_chunk_owners(&self) -> Result<Vec<FileId>, StorageError> {
        self.backend.orphaned_chunk_owners().await
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>, StorageError> {
        self.backend.list_files().await
    }
}
