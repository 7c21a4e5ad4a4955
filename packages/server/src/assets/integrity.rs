use std::collections::HashSet;

use common::storage::{BlobStore, FileId};
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};
use serde::Serialize;
use tracing::instrument;

use super::category::AssetCategory;
use super::set::EventAssetSet;
use crate::entity::event;
use crate::error::AppError;

/// An event reference whose target file no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct DanglingReference {
    #[schema(example = 3)]
    pub event_id: i32,
    pub category: AssetCategory,
    #[schema(value_type = String)]
    pub file_id: FileId,
}

/// Cross-check of event references against the blob store.
#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
pub struct IntegrityReport {
    /// References to files that have no finalized record.
    pub dangling_references: Vec<DanglingReference>,
    /// Finalized files that no event references.
    #[schema(value_type = Vec<String>)]
    pub unreferenced_files: Vec<FileId>,
    /// Ids owning chunks without a finalized record, left by interrupted
    /// uploads or deletes.
    #[schema(value_type = Vec<String>)]
    pub orphaned_chunk_owners: Vec<FileId>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling_references.is_empty()
            && self.unreferenced_files.is_empty()
            && self.orphaned_chunk_owners.is_empty()
    }
}

/// Build an integrity report. Read-only: nothing is repaired.
#[instrument(skip_all)]
pub async fn check<C: ConnectionTrait>(
    db: &C,
    store: &dyn BlobStore,
) -> Result<IntegrityReport, AppError> {
    let events = event::Entity::find()
        .order_by_asc(event::Column::Id)
        .all(db)
        .await?;
    let files = store.list_files().await?;
    let orphaned_chunk_owners = store.orphaned_chunk_owners().await?;

    let stored: HashSet<FileId> = files.iter().map(|f| f.id).collect();
    let mut referenced = HashSet::new();
    let mut dangling_references = Vec::new();

    for model in &events {
        let assets = EventAssetSet::from_event(model)?;
        for (category, file_id) in assets.references() {
            referenced.insert(file_id);
            if !stored.contains(&file_id) {
                dangling_references.push(DanglingReference {
                    event_id: model.id,
                    category,
                    file_id,
                });
            }
        }
    }

    let unreferenced_files = files
        .iter()
        .map(|f| f.id)
        .filter(|id| !referenced.contains(id))
        .collect();

    let report = IntegrityReport {
        dangling_references,
        unreferenced_files,
        orphaned_chunk_owners,
    };
    tracing::info!(
        dangling = report.dangling_references.len(),
        unreferenced = report.unreferenced_files.len(),
        orphaned = report.orphaned_chunk_owners.len(),
        "Integrity check finished"
    );
    Ok(report)
}
