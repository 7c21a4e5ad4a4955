use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::member;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMemberRequest {
    #[serde(alias = "memberName")]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "Treasurer")]
    pub position: String,
    /// Display order, lowest first.
    #[schema(example = 2)]
    pub priority: i32,
}

pub fn validate_create_member(payload: &CreateMemberRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Member name", 128)?;
    validate_name(&payload.position, "Position", 128)?;
    if payload.priority < 0 {
        return Err(AppError::Validation("Priority must be >= 0".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MemberResponse {
    #[schema(example = 4)]
    pub id: i32,
    pub name: String,
    pub position: String,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

impl From<member::Model> for MemberResponse {
    fn from(model: member::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            position: model.position,
            priority: model.priority,
            created_at: model.created_at,
        }
    }
}

/// Members ordered by priority.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MemberListResponse {
    pub members: Vec<MemberResponse>,
}
