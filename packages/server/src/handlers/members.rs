use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::member;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::member::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Members",
    operation_id = "createMember",
    summary = "Add a club member",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(admin_id = auth_user.admin_id, name = %payload.name))]
pub async fn create_member(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_member(&payload)?;

    let model = member::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        position: Set(payload.position.trim().to_string()),
        priority: Set(payload.priority),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Members",
    operation_id = "listMembers",
    summary = "List members by priority",
    description = "Lowest priority value first; ties keep insertion order.",
    responses(
        (status = 200, description = "Members", body = MemberListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_members(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MemberListResponse>, AppError> {
    let members = member::Entity::find()
        .order_by_asc(member::Column::Priority)
        .order_by_asc(member::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok(Json(MemberListResponse { members }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Members",
    operation_id = "deleteMember",
    summary = "Remove a member",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Member not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.admin_id, member_id = id))]
pub async fn delete_member(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let result = member::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Member not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
