use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fs_chunks")]
pub struct Model {
    /// Owning file id. Not a foreign key, see `file_record`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub file_id: Uuid,

    /// Zero-based position within the file.
    #[sea_orm(primary_key, auto_increment = false)]
    pub n: i32,

    pub data: Vec<u8>,
}

impl ActiveModelBehavior for ActiveModel {}
