use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StorageError;
use super::id::FileId;
use super::model::{Chunk, FileRecord};
use super::traits::ChunkBackend;

#[derive(Default)]
struct MemoryState {
    files: HashMap<FileId, FileRecord>,
    chunks: BTreeMap<(FileId, u32), Vec<u8>>,
}

/// In-process chunk backend. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All chunks stored for `id`, ordered by index.
    pub async fn chunks(&self, id: FileId) -> Vec<Chunk> {
        let state = self.state.read().await;
        state
            .chunks
            .range((id, 0)..=(id, u32::MAX))
            .map(|(&(file_id, index), data)| Chunk {
                file_id,
                index,
                data: data.clone(),
            })
            .collect()
    }

    /// Total number of chunk rows across all files.
    pub async fn chunk_rows(&self) -> usize {
        self.state.read().await.chunks.len()
    }
}

#[async_trait]
impl ChunkBackend for MemoryBackend {
    async fn insert_chunk(&self, chunk: Chunk) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let key = (chunk.file_id, chunk.index);
        if state.chunks.contains_key(&key) {
            return Err(StorageError::Write(format!(
                "duplicate chunk {} for file {}",
                chunk.index, chunk.file_id
            )));
        }
        state.chunks.insert(key, chunk.data);
        Ok(())
    }

    async fn insert_file(&self, record: FileRecord) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if state.files.contains_key(&record.id) {
            return Err(StorageError::Write(format!(
                "file {} already exists",
                record.id
            )));
        }
        state.files.insert(record.id, record);
        Ok(())
    }

    async fn find_file(&self, id: FileId) -> Result<Option<FileRecord>, StorageError> {
        Ok(self.state.read().await.files.get(&id).cloned())
    }

    async fn read_chunk(&self, id: FileId, index: u32) -> Result<Option<Chunk>, StorageError> {
        let state = self.state.read().await;
        Ok(state.chunks.get(&(id, index)).map(|data| Chunk {
            file_id: id,
            index,
            data: data.clone(),
        }))
    }

    async fn delete_file(&self, id: FileId) -> Result<bool, StorageError> {
        Ok(self.state.write().await.files.remove(&id).is_some())
    }

    async fn delete_chunks(&self, id: FileId) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let before = state.chunks.len();
        state.chunks.retain(|&(file_id, _), _| file_id != id);
        Ok((before - state.chunks.len()) as u64)
    }

    async fn orphaned_chunk_owners(&self) -> Result<Vec<FileId>, StorageError> {
        let state = self.state.read().await;
        let mut owners: Vec<FileId> = state
            .chunks
            .keys()
            .map(|&(file_id, _)| file_id)
            .filter(|file_id| !state.files.contains_key(file_id))
            .collect();
        owners.dedup();
        Ok(owners)
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>, StorageError> {
        let state = self.state.read().await;
        let mut files: Vec<FileRecord> = state.files.values().cloned().collect();
        files.sort_by_key(|f| f.id);
        Ok(files)
    }
}
