mod download;
mod error;
mod hash;
mod id;
mod model;
mod store;
mod traits;
mod upload;

pub mod memory;

pub use error::StorageError;
pub use hash::{ContentHash, ContentHasher};
pub use id::FileId;
pub use model::{Chunk, ChunkStream, DEFAULT_CHUNK_SIZE, Download, FileHandle, FileRecord};
pub use store::ChunkStore;
pub use traits::{BlobStore, BoxReader, ChunkBackend};
pub use upload::UploadStream;
