use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub about: String,

    pub winner: Option<String>,
    pub runner_up: Option<String>,

    /// JSON array of guest names.
    #[sea_orm(column_type = "JsonBinary")]
    pub guests: Json,

    /// JSON array of organizer names.
    #[sea_orm(column_type = "JsonBinary")]
    pub organizers: Json,

    /// Weak reference into `fs_files`.
    pub pdf_file: Option<Uuid>,

    /// JSON arrays of `fs_files` ids, in upload order.
    #[sea_orm(column_type = "JsonBinary")]
    pub guest_images: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub winner_images: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub random_images: Json,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
