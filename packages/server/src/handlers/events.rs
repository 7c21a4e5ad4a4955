use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use common::storage::{BlobStore, FileHandle, FileId, StorageError};
use futures::future::join_all;
use sea_orm::*;
use tracing::{instrument, warn};

use crate::assets::{
    self, AssetCategory, DeletionOutcome, EventAssetSet, NewUpload, PdfReplacement,
};
use crate::config::AppConfig;
use crate::entity::event;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::event::*;
use crate::state::AppState;
use crate::utils::filename::validate_upload_filename;

pub fn event_body_limit(config: &AppConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.storage.max_request_size)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List events",
    description = "Returns every event, newest first. Public.",
    responses(
        (status = 200, description = "Events", body = EventListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_events(State(state): State<AppState>) -> Result<Json<EventListResponse>, AppError> {
    let models = event::Entity::find()
        .order_by_desc(event::Column::CreatedAt)
        .order_by_desc(event::Column::Id)
        .all(&state.db)
        .await?;

    let events = models
        .into_iter()
        .map(EventResponse::from_model)
        .collect::<Result<_, _>>()?;

    Ok(Json(EventListResponse { events }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    operation_id = "getEvent",
    summary = "Get an event",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(event_id = id))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, AppError> {
    let model = find_event(&state.db, id).await?;
    Ok(Json(EventResponse::from_model(model)?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    description = "Multipart form. Text fields: `eventName` (required), `eventAbout`, `eventWinner`, \
        `eventRunnerUp`, repeated `guests` and `organizers`. File fields: `pdfFile` (at most one), \
        and any number of fields whose names start with `guestImages`, `winnerRunnerUpImages` or \
        `eventImages`. Files are stored concurrently; a file that fails to store is listed in \
        `upload_failures` and the event is created without it.",
    request_body(content_type = "multipart/form-data", description = "Event fields and files"),
    responses(
        (status = 201, description = "Event created", body = EventWriteResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Request body too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(admin_id = auth_user.admin_id))]
pub async fn create_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let submission = read_event_form(multipart).await?.into_create()?;
    let store = &*state.blob_store;

    let uploaded = upload_all(store, submission.files).await;
    let new_ids = uploaded.file_ids();
    let reconciliation = assets::reconcile(
        store,
        EventAssetSet::default(),
        uploaded.images,
        &[],
        PdfReplacement {
            new_upload: uploaded.pdf,
            delete_existing: false,
        },
    )
    .await;

    let now = Utc::now();
    let mut active = event::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    submission.fields.write_to(&mut active);
    reconciliation.assets.write_to(&mut active);

    let model = match active.insert(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            discard_uploads(store, &new_ids).await;
            return Err(e.into());
        }
    };
    tracing::info!(event_id = model.id, files = new_ids.len(), "Event created");

    Ok((
        StatusCode::CREATED,
        Json(EventWriteResponse {
            event: EventResponse::from_model(model)?,
            deletions: reconciliation.outcomes,
            upload_failures: uploaded.failures,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Events",
    operation_id = "updateEvent",
    summary = "Update an event",
    description = "Multipart form with the same fields as create; text fields replace the stored \
        values. Additionally accepts repeated `deleteImages` (file IDs to delete) and `deletePdf` \
        (boolean). Deletions run before new files are attached, so a new `pdfFile` always wins. \
        Each deletion is reported individually in `deletions`; a failed deletion does not fail \
        the request.",
    params(("id" = i32, Path, description = "Event ID")),
    request_body(content_type = "multipart/form-data", description = "Event fields, files and deletions"),
    responses(
        (status = 200, description = "Event updated", body = EventWriteResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Request body too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(admin_id = auth_user.admin_id, event_id = id))]
pub async fn update_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<EventWriteResponse>, AppError> {
    let submission = read_event_form(multipart).await?.into_update()?;
    let existing = find_event(&state.db, id).await?;
    let current = EventAssetSet::from_event(&existing)?;
    let store = &*state.blob_store;

    let uploaded = upload_all(store, submission.files).await;
    let new_ids = uploaded.file_ids();
    let reconciliation = assets::reconcile(
        store,
        current,
        uploaded.images,
        &submission.delete_images,
        PdfReplacement {
            new_upload: uploaded.pdf,
            delete_existing: submission.delete_pdf,
        },
    )
    .await;

    let mut active: event::ActiveModel = existing.into();
    submission.fields.write_to(&mut active);
    reconciliation.assets.write_to(&mut active);
    active.updated_at = Set(Utc::now());

    // Deletions already happened and cannot be undone; only fresh uploads are rolled back.
    let model = match active.update(&state.db).await {
        Ok(model) => model,
        Err(e) => {
            discard_uploads(store, &new_ids).await;
            return Err(e.into());
        }
    };

    Ok(Json(EventWriteResponse {
        event: EventResponse::from_model(model)?,
        deletions: reconciliation.outcomes,
        upload_failures: uploaded.failures,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    operation_id = "deleteEvent",
    summary = "Delete an event and its files",
    description = "Deletes the event, then every file it referenced. Files that are already \
        gone or fail to delete are reported in `deletions`; any left behind show up as \
        unreferenced in the integrity report.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = EventDeleteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(admin_id = auth_user.admin_id, event_id = id))]
pub async fn delete_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventDeleteResponse>, AppError> {
    let existing = find_event(&state.db, id).await?;
    let deletions = remove_event(&state.db, &*state.blob_store, &existing).await?;

    tracing::info!(files = deletions.len(), "Event deleted");
    Ok(Json(EventDeleteResponse { id, deletions }))
}

/// Delete the row first so a failure never leaves references to purged files.
async fn remove_event<C: ConnectionTrait>(
    db: &C,
    store: &dyn BlobStore,
    model: &event::Model,
) -> Result<Vec<DeletionOutcome>, AppError> {
    let event_assets = EventAssetSet::from_event(model)?;
    event::Entity::delete_by_id(model.id).exec(db).await?;
    Ok(assets::purge(store, &event_assets).await)
}

async fn find_event<C: ConnectionTrait>(db: &C, id: i32) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the configured limit".into())
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}

/// Buffer an event form. Unknown text fields are ignored; unknown file fields are rejected.
async fn read_event_form(mut multipart: Multipart) -> Result<EventForm, AppError> {
    let mut form = EventForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(filename) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(multipart_error)?;
            if !form.push_text(&name, value) {
                tracing::debug!(field = %name, "Ignoring unknown form field");
            }
            continue;
        };

        let category = AssetCategory::from_field_name(&name)
            .ok_or_else(|| AppError::Validation(format!("Unexpected file field: {name}")))?;
        let declared_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        // Browsers submit an empty part for a file input left blank.
        if filename.is_empty() && data.is_empty() {
            continue;
        }

        let filename = validate_upload_filename(&filename)
            .map_err(|e| AppError::Validation(e.message().into()))?
            .to_string();
        let content_type = resolve_content_type(declared_type.as_deref(), &filename);

        form.files.push(FilePart {
            field: name,
            category,
            filename,
            content_type,
            data,
        });
    }

    Ok(form)
}

fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
        _ => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string(),
    }
}

/// Files stored for one request, split the way `reconcile` consumes them.
struct Uploaded {
    images: Vec<NewUpload>,
    pdf: Option<FileHandle>,
    failures: Vec<UploadFailure>,
}

impl Uploaded {
    fn file_ids(&self) -> Vec<FileId> {
        self.images
            .iter()
            .map(|u| u.handle.id)
            .chain(self.pdf.iter().map(|h| h.id))
            .collect()
    }
}

/// Store every file part concurrently. Results keep request order.
async fn upload_all(store: &dyn BlobStore, files: Vec<FilePart>) -> Uploaded {
    let results = join_all(
        files
            .iter()
            .map(|part| store.upload(&part.data, &part.filename, &part.content_type)),
    )
    .await;

    let mut uploaded = Uploaded {
        images: Vec::new(),
        pdf: None,
        failures: Vec::new(),
    };
    for (part, result) in files.into_iter().zip(results) {
        match result {
            Ok(handle) if part.category == AssetCategory::Pdf => uploaded.pdf = Some(handle),
            Ok(handle) => uploaded.images.push(NewUpload {
                category: part.category,
                handle,
            }),
            Err(e) => {
                warn!(field = %part.field, filename = %part.filename, error = %e, "Upload failed");
                uploaded.failures.push(UploadFailure {
                    message: upload_failure_message(&e),
                    field: part.field,
                    filename: part.filename,
                });
            }
        }
    }
    uploaded
}

fn upload_failure_message(err: &StorageError) -> String {
    match err {
        StorageError::SizeLimitExceeded { limit, .. } => {
            format!("File exceeds maximum size of {limit} bytes")
        }
        _ => "File could not be stored".into(),
    }
}

async fn discard_uploads(store: &dyn BlobStore, ids: &[FileId]) {
    for &id in ids {
        if let Err(e) = store.delete_file(id).await {
            warn!(file_id = %id, error = %e, "Failed to discard upload after save failure");
        }
    }
}
