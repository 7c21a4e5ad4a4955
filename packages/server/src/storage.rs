use std::sync::Arc;

use async_trait::async_trait;
use common::storage::memory::MemoryBackend;
use common::storage::{
    BlobStore, Chunk, ChunkBackend, ChunkStore, ContentHash, FileId, FileRecord, StorageError,
};
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::config::{StorageBackendKind, StorageConfig};
use crate::entity::{file_chunk, file_record};

/// Build the blob store selected by `storage.backend`.
pub fn build_blob_store(config: &StorageConfig, db: &DatabaseConnection) -> Arc<dyn BlobStore> {
    let backend: Arc<dyn ChunkBackend> = match config.backend {
        StorageBackendKind::Database => Arc::new(DbChunkBackend::new(db.clone())),
        StorageBackendKind::Memory => {
            tracing::warn!("Using in-memory blob storage; uploads are lost on restart");
            Arc::new(MemoryBackend::new())
        }
    };
    Arc::new(
        ChunkStore::new(backend)
            .with_chunk_size(config.chunk_size)
            .with_max_file_size(config.max_file_size),
    )
}

/// `ChunkBackend` over the `fs_files` and `fs_chunks` tables.
#[derive(Clone)]
pub struct DbChunkBackend {
    db: DatabaseConnection,
}

impl DbChunkBackend {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn write_err(err: DbErr) -> StorageError {
    StorageError::Write(err.to_string())
}

fn read_err(err: DbErr) -> StorageError {
    StorageError::Read(err.to_string())
}

fn record_from_model(model: file_record::Model) -> Result<FileRecord, StorageError> {
    let id = FileId::from_uuid(model.id);
    let length = u64::try_from(model.length)
        .map_err(|_| StorageError::Corrupt(format!("file {id} has negative length")))?;
    let chunk_size = u32::try_from(model.chunk_size)
        .map_err(|_| StorageError::Corrupt(format!("file {id} has negative chunk size")))?;

    Ok(FileRecord {
        id,
        name: model.name,
        content_type: model.content_type,
        length,
        chunk_size,
        content_hash: ContentHash::from_hex(&model.content_hash)?,
        uploaded_at: model.uploaded_at,
    })
}

fn chunk_index(index: u32) -> Result<i32, StorageError> {
    i32::try_from(index).map_err(|_| StorageError::Write(format!("chunk index {index} overflows")))
}

#[async_trait]
impl ChunkBackend for DbChunkBackend {
    async fn insert_chunk(&self, chunk: Chunk) -> Result<(), StorageError> {
        let model = file_chunk::ActiveModel {
            file_id: Set(chunk.file_id.as_uuid()),
            n: Set(chunk_index(chunk.index)?),
            data: Set(chunk.data),
        };
        file_chunk::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(write_err)?;
        Ok(())
    }

    async fn insert_file(&self, record: FileRecord) -> Result<(), StorageError> {
        let length = i64::try_from(record.length)
            .map_err(|_| StorageError::Write(format!("file {} is too large", record.id)))?;
        let chunk_size = i32::try_from(record.chunk_size)
            .map_err(|_| StorageError::Write(format!("chunk size {} overflows", record.chunk_size)))?;

        let model = file_record::ActiveModel {
            id: Set(record.id.as_uuid()),
            name: Set(record.name),
            content_type: Set(record.content_type),
            length: Set(length),
            chunk_size: Set(chunk_size),
            content_hash: Set(record.content_hash.to_hex()),
            uploaded_at: Set(record.uploaded_at),
        };
        file_record::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(write_err)?;
        Ok(())
    }

    async fn find_file(&self, id: FileId) -> Result<Option<FileRecord>, StorageError> {
        file_record::Entity::find_by_id(id.as_uuid())
            .one(&self.db)
            .await
            .map_err(read_err)?
            .map(record_from_model)
            .transpose()
    }

    async fn read_chunk(&self, id: FileId, index: u32) -> Result<Option<Chunk>, StorageError> {
        let n = i32::try_from(index).map_err(|_| StorageError::MissingChunk { file_id: id, index })?;
        let model = file_chunk::Entity::find_by_id((id.as_uuid(), n))
            .one(&self.db)
            .await
            .map_err(read_err)?;

        Ok(model.map(|m| Chunk {
            file_id: id,
            index,
            data: m.data,
        }))
    }

    async fn delete_file(&self, id: FileId) -> Result<bool, StorageError> {
        let result = file_record::Entity::delete_by_id(id.as_uuid())
            .exec(&self.db)
            .await
            .map_err(write_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_chunks(&self, id: FileId) -> Result<u64, StorageError> {
        let result = file_chunk::Entity::delete_many()
            .filter(file_chunk::Column::FileId.eq(id.as_uuid()))
            .exec(&self.db)
            .await
            .map_err(write_err)?;
        Ok(result.rows_affected)
    }

    async fn orphaned_chunk_owners(&self) -> Result<Vec<FileId>, StorageError> {
        let owners: Vec<Uuid> = file_chunk::Entity::find()
            .select_only()
            .column(file_chunk::Column::FileId)
            .distinct()
            .filter(
                file_chunk::Column::FileId.not_in_subquery(
                    Query::select()
                        .column(file_record::Column::Id)
                        .from(file_record::Entity)
                        .to_owned(),
                ),
            )
            .order_by_asc(file_chunk::Column::FileId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(read_err)?;

        Ok(owners.into_iter().map(FileId::from_uuid).collect())
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>, StorageError> {
        file_record::Entity::find()
            .order_by_asc(file_record::Column::Id)
            .all(&self.db)
            .await
            .map_err(read_err)?
            .into_iter()
            .map(record_from_model)
            .collect()
    }
}
