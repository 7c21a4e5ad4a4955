use common::storage::{BlobStore, FileHandle, FileId};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::category::AssetCategory;
use super::set::EventAssetSet;

/// A completed upload waiting to be attached to an event.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub category: AssetCategory,
    pub handle: FileHandle,
}

/// Requested change to an event's pdf slot.
#[derive(Debug, Clone, Default)]
pub struct PdfReplacement {
    pub new_upload: Option<FileHandle>,
    pub delete_existing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStatus {
    Deleted,
    NotFound,
    Failed,
}

/// Result of deleting one file during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct DeletionOutcome {
    #[schema(value_type = String, example = "01936f0e-1234-7abc-8000-000000000001")]
    pub file_id: FileId,
    pub status: DeletionStatus,
}

/// New reference set plus the per-id outcome of every deletion attempted.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub assets: EventAssetSet,
    pub outcomes: Vec<DeletionOutcome>,
}

impl Reconciliation {
    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != DeletionStatus::Deleted)
    }
}

/// Merge deletions and new uploads into an event's references.
///
/// Steps run in a fixed order:
/// 1. delete each requested id, dropping it from the set only on success;
/// 2. if asked, delete the current pdf and clear the slot whatever the outcome;
/// 3. append new uploads, where a new pdf overwrites the slot.
///
/// A failed deletion never aborts the batch; it is recorded in `outcomes`.
#[instrument(skip_all, fields(
    deletions = deletion_requests.len(),
    uploads = new_uploads.len(),
    delete_pdf = pdf.delete_existing,
))]
pub async fn reconcile(
    store: &dyn BlobStore,
    current: EventAssetSet,
    new_uploads: Vec<NewUpload>,
    deletion_requests: &[FileId],
    pdf: PdfReplacement,
) -> Reconciliation {
    let mut assets = current;
    let mut outcomes = Vec::with_capacity(deletion_requests.len() + 1);

    for &file_id in deletion_requests {
        let outcome = delete_one(store, file_id).await;
        if outcome.status == DeletionStatus::Deleted {
            assets.remove(file_id);
        }
        outcomes.push(outcome);
    }

    if pdf.delete_existing
        && let Some(existing) = assets.pdf_file.take()
    {
        outcomes.push(delete_one(store, existing).await);
    }

    for upload in new_uploads {
        assets.push(upload.category, upload.handle.id);
    }
    if let Some(handle) = pdf.new_upload {
        assets.pdf_file = Some(handle.id);
    }

    let reconciliation = Reconciliation { assets, outcomes };
    let failed = reconciliation.failures().count();
    if failed > 0 {
        warn!(failed, "Reconciliation finished with failed deletions");
    } else {
        info!("Reconciliation finished");
    }
    reconciliation
}

/// Delete every file an event references, ahead of deleting the event itself.
#[instrument(skip_all, fields(files = assets.file_ids().len()))]
pub async fn purge(store: &dyn BlobStore, assets: &EventAssetSet) -> Vec<DeletionOutcome> {
    let mut outcomes = Vec::new();
    for file_id in assets.file_ids() {
        outcomes.push(delete_one(store, file_id).await);
    }
    outcomes
}

async fn delete_one(store: &dyn BlobStore, file_id: FileId) -> DeletionOutcome {
    let status = match store.delete_file(file_id).await {
        Ok(()) => DeletionStatus::Deleted,
        Err(e) if e.is_not_found() => {
            warn!(%file_id, "File to delete does not exist");
            DeletionStatus::NotFound
        }
        Err(e) => {
            warn!(%file_id, error = %e, "Failed to delete file");
            DeletionStatus::Failed
        }
    };
    DeletionOutcome { file_id, status }
}
