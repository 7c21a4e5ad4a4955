use axum::body::Bytes;
use chrono::{DateTime, Utc};
use common::storage::FileId;
use sea_orm::Set;
use sea_orm::entity::prelude::Json;
use serde::Serialize;

use super::shared::{clean_names, non_blank, validate_name, validate_text};
use crate::assets::{AssetCategory, DeletionOutcome, EventAssetSet};
use crate::entity::event;
use crate::error::AppError;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_ABOUT_LEN: usize = 20_000;
pub const MAX_PEOPLE: usize = 100;

/// A file part of an event form, buffered until uploads start.
#[derive(Debug)]
pub struct FilePart {
    pub field: String,
    pub category: AssetCategory,
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Raw fields collected from an event multipart form.
#[derive(Debug, Default)]
pub struct EventForm {
    pub name: Option<String>,
    pub about: Option<String>,
    pub winner: Option<String>,
    pub runner_up: Option<String>,
    pub guests: Vec<String>,
    pub organizers: Vec<String>,
    pub delete_images: Vec<String>,
    pub delete_pdf: Option<String>,
    pub files: Vec<FilePart>,
}

impl EventForm {
    /// Record a text part. Returns `false` for field names the form does not use.
    pub fn push_text(&mut self, field: &str, value: String) -> bool {
        // Accept `guests[]`-style names sent by form libraries.
        match field.strip_suffix("[]").unwrap_or(field) {
            "eventName" => self.name = Some(value),
            "eventAbout" => self.about = Some(value),
            "eventWinner" => self.winner = Some(value),
            "eventRunnerUp" => self.runner_up = Some(value),
            "guests" => self.guests.push(value),
            "organizers" => self.organizers.push(value),
            "deleteImages" => self.delete_images.push(value),
            "deletePdf" => self.delete_pdf = Some(value),
            _ => return false,
        }
        true
    }

    /// Validate a form submitted to create an event.
    pub fn into_create(self) -> Result<EventSubmission, AppError> {
        if !self.delete_images.is_empty() || self.delete_pdf.is_some() {
            return Err(AppError::Validation(
                "deleteImages and deletePdf are only accepted when updating an event".into(),
            ));
        }
        self.into_submission()
    }

    /// Validate a form submitted to update an event.
    pub fn into_update(self) -> Result<EventSubmission, AppError> {
        self.into_submission()
    }

    fn into_submission(self) -> Result<EventSubmission, AppError> {
        let name = self.name.unwrap_or_default();
        validate_name(&name, "Event name", MAX_NAME_LEN)?;
        let about = self.about.unwrap_or_default();
        validate_text(&about, "Event description", MAX_ABOUT_LEN)?;

        let guests = clean_names(self.guests);
        let organizers = clean_names(self.organizers);
        if guests.len() > MAX_PEOPLE || organizers.len() > MAX_PEOPLE {
            return Err(AppError::Validation(format!(
                "At most {MAX_PEOPLE} guests and {MAX_PEOPLE} organizers are allowed"
            )));
        }
        for person in guests.iter().chain(&organizers) {
            validate_name(person, "Guest and organizer names", MAX_NAME_LEN)?;
        }

        let winner = non_blank(self.winner);
        let runner_up = non_blank(self.runner_up);
        for place in winner.iter().chain(&runner_up) {
            validate_name(place, "Winner and runner-up", MAX_NAME_LEN)?;
        }

        let mut delete_images = Vec::with_capacity(self.delete_images.len());
        for raw in &self.delete_images {
            let id = FileId::parse(raw.trim())
                .map_err(|_| AppError::Validation(format!("Invalid file ID in deleteImages: {raw}")))?;
            if !delete_images.contains(&id) {
                delete_images.push(id);
            }
        }

        let delete_pdf = match self.delete_pdf.as_deref() {
            None => false,
            Some(raw) => parse_flag(raw)?,
        };

        let pdf_parts = self
            .files
            .iter()
            .filter(|f| f.category == AssetCategory::Pdf)
            .count();
        if pdf_parts > 1 {
            return Err(AppError::Validation("At most one pdfFile may be uploaded".into()));
        }

        Ok(EventSubmission {
            fields: EventFields {
                name: name.trim().to_string(),
                about,
                winner,
                runner_up,
                guests,
                organizers,
            },
            delete_images,
            delete_pdf,
            files: self.files,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "deletePdf must be a boolean, got {raw:?}"
        ))),
    }
}

/// A validated event form.
#[derive(Debug)]
pub struct EventSubmission {
    pub fields: EventFields,
    pub delete_images: Vec<FileId>,
    pub delete_pdf: bool,
    pub files: Vec<FilePart>,
}

/// The descriptive (non-file) columns of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub name: String,
    pub about: String,
    pub winner: Option<String>,
    pub runner_up: Option<String>,
    pub guests: Vec<String>,
    pub organizers: Vec<String>,
}

impl EventFields {
    pub fn write_to(self, active: &mut event::ActiveModel) {
        active.name = Set(self.name);
        active.about = Set(self.about);
        active.winner = Set(self.winner);
        active.runner_up = Set(self.runner_up);
        active.guests = Set(names_to_json(self.guests));
        active.organizers = Set(names_to_json(self.organizers));
    }
}

fn names_to_json(names: Vec<String>) -> Json {
    Json::Array(names.into_iter().map(Json::String).collect())
}

fn names_from_json(value: &Json, column: &str, event_id: i32) -> Result<Vec<String>, AppError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(format!("event {event_id} has malformed {column}: {e}")))
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct EventResponse {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Spring Hackathon")]
    pub name: String,
    pub about: String,
    #[schema(example = "Team Rocket")]
    pub winner: Option<String>,
    pub runner_up: Option<String>,
    #[schema(example = json!(["Grace Hopper"]))]
    pub guests: Vec<String>,
    pub organizers: Vec<String>,
    /// File ID of the event brochure, served by `GET /api/v1/files/{id}`.
    #[schema(value_type = Option<String>)]
    pub pdf_file: Option<FileId>,
    #[schema(value_type = Vec<String>)]
    pub guest_images: Vec<FileId>,
    #[schema(value_type = Vec<String>)]
    pub winner_images: Vec<FileId>,
    #[schema(value_type = Vec<String>)]
    pub random_images: Vec<FileId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn from_model(model: event::Model) -> Result<Self, AppError> {
        let assets = EventAssetSet::from_event(&model)?;
        Ok(Self {
            guests: names_from_json(&model.guests, "guests", model.id)?,
            organizers: names_from_json(&model.organizers, "organizers", model.id)?,
            id: model.id,
            name: model.name,
            about: model.about,
            winner: model.winner,
            runner_up: model.runner_up,
            pdf_file: assets.pdf_file,
            guest_images: assets.guest_images,
            winner_images: assets.winner_images,
            random_images: assets.random_images,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
}

/// A file part that could not be stored. The rest of the request still applies.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadFailure {
    #[schema(example = "guestImages[1]")]
    pub field: String,
    #[schema(example = "speaker.jpg")]
    pub filename: String,
    #[schema(example = "File exceeds maximum size of 16777216 bytes")]
    pub message: String,
}

/// Result of creating or updating an event.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EventWriteResponse {
    pub event: EventResponse,
    /// Outcome of every file deletion attempted, in request order.
    pub deletions: Vec<DeletionOutcome>,
    pub upload_failures: Vec<UploadFailure>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EventDeleteResponse {
    #[schema(example = 3)]
    pub id: i32,
    pub deletions: Vec<DeletionOutcome>,
}
