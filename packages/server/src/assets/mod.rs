//! Event asset bookkeeping: which stored files an event points at, and how
//! uploads and deletions are folded into those references.

mod category;
pub mod integrity;
mod reconcile;
mod set;

pub use category::AssetCategory;
pub use reconcile::{
    DeletionOutcome, DeletionStatus, NewUpload, PdfReplacement, Reconciliation, purge, reconcile,
};
pub use set::EventAssetSet;
