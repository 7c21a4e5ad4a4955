use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::assets::integrity::{self, IntegrityReport};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/integrity",
    tag = "Integrity",
    operation_id = "checkIntegrity",
    summary = "Cross-check event references against stored files",
    description = "Read-only report of event references to missing files, stored files no event \
        references, and chunks left behind by interrupted uploads or deletes.",
    responses(
        (status = 200, description = "Integrity report", body = IntegrityReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.admin_id))]
pub async fn check_integrity(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<IntegrityReport>, AppError> {
    Ok(Json(integrity::check(&state.db, &*state.blob_store).await?))
}
