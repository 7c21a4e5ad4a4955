//! Shared building blocks for the clubhouse backend.
//!
//! [`storage`] holds the chunked blob store: files are split into fixed-size
//! chunks behind a [`storage::ChunkBackend`], and callers work against the
//! [`storage::BlobStore`] trait.

pub mod storage;
