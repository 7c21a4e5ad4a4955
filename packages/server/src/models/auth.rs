use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::admin;
use crate::error::AppError;

/// Request body for admin login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "president")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "president")]
    pub username: String,
}

/// Current authenticated admin.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "president")]
    pub username: String,
}

/// Request body for creating another admin account.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAdminRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "treasurer")]
    pub username: String,
    /// Unique contact address.
    #[schema(example = "treasurer@club.example")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_create_admin_request(payload: &CreateAdminRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    let email = payload.email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed || email.len() > 254 || email.contains(char::is_whitespace) {
        return Err(AppError::Validation("Email address is invalid".into()));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// A stored admin account, without its password hash.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminResponse {
    #[schema(example = 2)]
    pub id: i32,
    #[schema(example = "treasurer")]
    pub username: String,
    #[schema(example = "treasurer@club.example")]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<admin::Model> for AdminResponse {
    fn from(model: admin::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
        }
    }
}
