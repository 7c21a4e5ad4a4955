use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::storage::FileId;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::utils::filename::content_disposition;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download a stored file",
    description = "Streams a file referenced by an event. Public. The ETag is the SHA-256 of the \
        content, so `If-None-Match` revalidation returns 304 without reading any chunks.",
    params(("id" = String, Path, description = "File ID (UUID)")),
    responses(
        (status = 200, description = "File content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 400, description = "Malformed file ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let file_id = FileId::parse(&id)?;
    // The chunk stream is lazy: nothing is read until the body is polled.
    let download = state.blob_store.download(file_id).await?;
    let etag = format!("\"{}\"", download.record.content_hash);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && etag_matches(val, &etag)
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let content_type = HeaderValue::from_str(download.content_type())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, download.record.length.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&download.record.name),
        )
        .header(header::ETAG, &etag)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Whether an `If-None-Match` header value matches `etag`. Weak comparison.
fn etag_matches(header_value: &str, etag: &str) -> bool {
    header_value
        .split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || tag.strip_prefix("W/").unwrap_or(tag) == etag)
}
