use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Finalized blob metadata.
///
/// Deliberately has no relation to `file_chunk`: chunks are written before
/// their record exists, so a foreign key would reject in-flight uploads.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fs_files")]
pub struct Model {
    /// UUIDv7 file id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Original upload filename.
    pub name: String,

    pub content_type: String,

    /// Total size in bytes.
    pub length: i64,

    pub chunk_size: i32,

    /// SHA-256 of the full content, hex encoded.
    pub content_hash: String,

    pub uploaded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
