use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::announcement;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::announcement::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Announcements",
    operation_id = "createAnnouncement",
    summary = "Post an announcement",
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement created", body = AnnouncementResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(admin_id = auth_user.admin_id))]
pub async fn create_announcement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAnnouncementRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_announcement(&payload)?;

    let model = announcement::ActiveModel {
        message: Set(payload.message.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(AnnouncementResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Announcements",
    operation_id = "listAnnouncements",
    summary = "List announcements, newest first",
    responses(
        (status = 200, description = "Announcements", body = AnnouncementListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_announcements(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AnnouncementListResponse>, AppError> {
    let announcements = announcement::Entity::find()
        .order_by_desc(announcement::Column::CreatedAt)
        .order_by_desc(announcement::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(AnnouncementResponse::from)
        .collect();

    Ok(Json(AnnouncementListResponse { announcements }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Announcements",
    operation_id = "deleteAnnouncement",
    summary = "Delete an announcement",
    params(("id" = i32, Path, description = "Announcement ID")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Announcement not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.admin_id, announcement_id = id))]
pub async fn delete_announcement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let result = announcement::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Announcement not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
