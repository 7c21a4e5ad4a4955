use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::announcement;
use crate::error::AppError;

const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAnnouncementRequest {
    #[serde(alias = "msg")]
    #[schema(example = "General body meeting moved to Thursday 6pm.")]
    pub message: String,
}

pub fn validate_create_announcement(payload: &CreateAnnouncementRequest) -> Result<(), AppError> {
    validate_name(&payload.message, "Message", MAX_MESSAGE_LEN)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AnnouncementResponse {
    #[schema(example = 12)]
    pub id: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<announcement::Model> for AnnouncementResponse {
    fn from(model: announcement::Model) -> Self {
        Self {
            id: model.id,
            message: model.message,
            created_at: model.created_at,
        }
    }
}

/// Announcements, newest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AnnouncementListResponse {
    pub announcements: Vec<AnnouncementResponse>,
}
