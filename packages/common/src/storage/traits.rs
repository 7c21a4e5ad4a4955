use std::io::Cursor;

use async_trait::async_trait;
use futures::TryStreamExt;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::id::FileId;
use super::model::{Chunk, Download, FileHandle, FileRecord};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Row-level persistence for file records and their chunks.
///
/// Implementations only move rows; chunking, ordering and the
/// record-after-chunks protocol live in [`ChunkStore`](super::ChunkStore).
#[async_trait]
pub trait ChunkBackend: Send + Sync {
    async fn insert_chunk(&self, chunk: Chunk) -> Result<(), StorageError>;

    /// Insert the record that marks a file as finalized.
    async fn insert_file(&self, record: FileRecord) -> Result<(), StorageError>;

    async fn find_file(&self, id: FileId) -> Result<Option<FileRecord>, StorageError>;

    async fn read_chunk(&self, id: FileId, index: u32) -> Result<Option<Chunk>, StorageError>;

    /// Returns `true` if a record existed and was removed.
    async fn delete_file(&self, id: FileId) -> Result<bool, StorageError>;

    /// Returns the number of chunks removed.
    async fn delete_chunks(&self, id: FileId) -> Result<u64, StorageError>;

    /// Ids that own chunks but have no finalized record.
    async fn orphaned_chunk_owners(&self) -> Result<Vec<FileId>, StorageError>;

    async fn list_files(&self) -> Result<Vec<FileRecord>, StorageError>;
}

/// Blob storage as seen by request handlers and the reconciliation engine.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an in-memory buffer as a new file.
    async fn upload(
        &self,
        data: &[u8],
        name: &str,
        content_type: &str,
    ) -> Result<FileHandle, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.upload_stream(reader, name, content_type).await
    }

    /// Store data from an async reader as a new file.
    async fn upload_stream(
        &self,
        reader: BoxReader,
        name: &str,
        content_type: &str,
    ) -> Result<FileHandle, StorageError>;

    /// Look up a finalized file record.
    async fn stat(&self, id: FileId) -> Result<FileRecord, StorageError>;

    /// Open a file for streaming.
    ///
    /// Fails with `NotFound` before any bytes are produced.
    async fn download(&self, id: FileId) -> Result<Download, StorageError>;

    /// Retrieve all bytes of a file.
    async fn read_all(&self, id: FileId) -> Result<Vec<u8>, StorageError> {
        let download = self.download(id).await?;
        // The recorded length is only a hint until the chunks agree with it.
        let hint = download
            .record
            .length
            .min(u64::from(download.record.chunk_size) * 4);
        let mut buf = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));
        let mut stream = download.stream;
        while let Some(chunk) = stream.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }

    /// Remove a file record and all of its chunks.
    async fn delete_file(&self, id: FileId) -> Result<(), StorageError>;

    async fn orphaned_chunk_owners(&self) -> Result<Vec<FileId>, StorageError>;

    async fn list_files(&self) -> Result<Vec<FileRecord>, StorageError>;
}
