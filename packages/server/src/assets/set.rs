use common::storage::FileId;
use sea_orm::Set;
use sea_orm::entity::prelude::Json;

use super::category::AssetCategory;
use crate::entity::event;
use crate::error::AppError;

/// The categorized file references owned by one event.
///
/// References are weak: each entry is only an id into the blob store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAssetSet {
    pub pdf_file: Option<FileId>,
    pub guest_images: Vec<FileId>,
    pub winner_images: Vec<FileId>,
    pub random_images: Vec<FileId>,
}

impl EventAssetSet {
    /// Attach `id` to `category`. The pdf slot is replaced, image lists grow.
    pub fn push(&mut self, category: AssetCategory, id: FileId) {
        match category {
            AssetCategory::Pdf => self.pdf_file = Some(id),
            AssetCategory::GuestImages => self.guest_images.push(id),
            AssetCategory::WinnerImages => self.winner_images.push(id),
            AssetCategory::RandomImages => self.random_images.push(id),
        }
    }

    /// Drop `id` from every category. Returns whether anything was removed.
    pub fn remove(&mut self, id: FileId) -> bool {
        let mut removed = false;
        for list in [
            &mut self.guest_images,
            &mut self.winner_images,
            &mut self.random_images,
        ] {
            let before = list.len();
            list.retain(|existing| *existing != id);
            removed |= list.len() != before;
        }
        if self.pdf_file == Some(id) {
            self.pdf_file = None;
            removed = true;
        }
        removed
    }

    /// Every reference with its category: pdf first, then guest, winner and
    /// random images in stored order.
    pub fn references(&self) -> Vec<(AssetCategory, FileId)> {
        let images = |category: AssetCategory, ids: &[FileId]| {
            ids.iter().map(move |id| (category, *id)).collect::<Vec<_>>()
        };

        self.pdf_file
            .map(|id| (AssetCategory::Pdf, id))
            .into_iter()
            .chain(images(AssetCategory::GuestImages, &self.guest_images))
            .chain(images(AssetCategory::WinnerImages, &self.winner_images))
            .chain(images(AssetCategory::RandomImages, &self.random_images))
            .collect()
    }

    pub fn file_ids(&self) -> Vec<FileId> {
        self.references().into_iter().map(|(_, id)| id).collect()
    }

    /// Read the reference columns of a stored event.
    pub fn from_event(model: &event::Model) -> Result<Self, AppError> {
        Ok(Self {
            pdf_file: model.pdf_file.map(FileId::from_uuid),
            guest_images: id_list(&model.guest_images, "guest_images", model.id)?,
            winner_images: id_list(&model.winner_images, "winner_images", model.id)?,
            random_images: id_list(&model.random_images, "random_images", model.id)?,
        })
    }

    /// Write the reference columns onto an event about to be saved.
    pub fn write_to(&self, active: &mut event::ActiveModel) {
        active.pdf_file = Set(self.pdf_file.map(|id| id.as_uuid()));
        active.guest_images = Set(to_json(&self.guest_images));
        active.winner_images = Set(to_json(&self.winner_images));
        active.random_images = Set(to_json(&self.random_images));
    }
}

fn id_list(value: &Json, column: &str, event_id: i32) -> Result<Vec<FileId>, AppError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone()).map_err(|e| {
        AppError::Internal(format!("event {event_id} has malformed {column}: {e}"))
    })
}

pub(crate) fn to_json(ids: &[FileId]) -> Json {
    Json::Array(ids.iter().map(|id| Json::String(id.to_string())).collect())
}
