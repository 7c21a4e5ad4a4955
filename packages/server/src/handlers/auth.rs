use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::admin;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AdminResponse, CreateAdminRequest, LoginRequest, LoginResponse, MeResponse,
    validate_create_admin_request, validate_login_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in as an admin",
    description = "Verifies the password and returns a bearer token for the other admin endpoints.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong username or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let admin = admin::Entity::find()
        .filter(admin::Column::Username.eq(payload.username.trim()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &admin.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(admin.id, &admin.username, &state.config.auth)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    tracing::info!(admin_id = admin.id, "Admin logged in");

    Ok(Json(LoginResponse {
        token,
        username: admin.username,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current admin",
    responses(
        (status = 200, description = "Authenticated admin", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(admin_id = auth_user.admin_id))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.admin_id,
        username: auth_user.username,
    })
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Admins",
    operation_id = "createAdmin",
    summary = "Create another admin account",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Username or email already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(created_by = auth_user.admin_id, username = %payload.username))]
pub async fn create_admin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_admin_request(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_admin = admin::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        email: Set(payload.email.trim().to_lowercase()),
        password: Set(hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let admin = new_admin.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Username or email already in use".into())
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(AdminResponse::from(admin))))
}
