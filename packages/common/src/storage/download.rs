use std::sync::Arc;

use super::error::StorageError;
use super::model::{ChunkStream, FileRecord};
use super::traits::ChunkBackend;

struct Cursor {
    backend: Arc<dyn ChunkBackend>,
    record: FileRecord,
    index: u32,
    seen: u64,
}

/// Build the lazy chunk sequence for a resolved record.
///
/// Each poll reads one chunk. Gaps, short middle chunks and a total that
/// disagrees with the recorded length are reported as errors rather than
/// silently truncating the output. A record whose chunk count cannot be
/// indexed is rejected up front.
pub(super) fn chunk_stream(
    backend: Arc<dyn ChunkBackend>,
    record: FileRecord,
) -> Result<ChunkStream, StorageError> {
    let count = record.chunk_count()?;
    let start = Cursor {
        backend,
        record,
        index: 0,
        seen: 0,
    };

    Ok(Box::pin(futures::stream::try_unfold(start, move |mut cur| async move {
        if cur.index >= count {
            if cur.seen != cur.record.length {
                return Err(StorageError::Corrupt(format!(
                    "file {} has {} bytes in chunks but records {}",
                    cur.record.id, cur.seen, cur.record.length
                )));
            }
            return Ok(None);
        }

        let file_id = cur.record.id;
        let index = cur.index;
        let chunk = cur
            .backend
            .read_chunk(file_id, index)
            .await?
            .ok_or(StorageError::MissingChunk { file_id, index })?;

        let is_last = index + 1 == count;
        if !is_last && chunk.data.len() != cur.record.chunk_size as usize {
            return Err(StorageError::Corrupt(format!(
                "chunk {index} of file {file_id} has {} bytes, expected {}",
                chunk.data.len(),
                cur.record.chunk_size
            )));
        }

        cur.seen += chunk.data.len() as u64;
        cur.index += 1;
        Ok(Some((chunk.data, cur)))
    })))
}
