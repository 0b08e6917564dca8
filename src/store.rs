//------------ Signature storage back ends --------------------------------
//!
//! An [`LshForest`](crate::LshForest) can optionally hold on to the raw
//! signature of every item it indexes, so that later stages (query-by-id,
//! linear-scan refinement, distance computation) can fetch it back by
//! [`Id`](crate::Id). Two back ends are available, selected at
//! construction time via [`StoreConfig`]: an in-memory [`MemoryStore`], or
//! an append-only, memory-mapped [`FileStore`].

use std::path::PathBuf;

use crate::error::LshForestError;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// How (or whether) an [`LshForest`](crate::LshForest) should retain the
/// raw signature of each inserted item.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Don't retain signatures at all. Any operation that needs one back
    /// (query-by-id, linear scan, distance-by-id, ...) fails with
    /// [`LshForestError::StoreDisabled`].
    Disabled,
    /// Keep every signature in a contiguous in-memory buffer.
    Memory,
    /// Append every signature to a binary file at `path`, reading it back
    /// through a memory map. Keeps process memory bounded independent of
    /// the number of items indexed.
    File(PathBuf),
}

/// Internal storage trait implemented by [`MemoryStore`] and [`FileStore`].
///
/// `put` is only ever called with monotonically increasing, contiguous
/// ids starting at 0 (the same discipline [`LshForest`](crate::LshForest)
/// uses for its own id allocation), so implementations may assume
/// append-only semantics.
pub(crate) trait SignatureStore: Send + Sync {
    /// Appends `signature` as the record for `id`. `id` is always
    /// `self.len()` at the time of the call.
    fn put(&mut self, id: u32, signature: &[u32]) -> Result<(), LshForestError>;

    /// Reads back the `d`-word signature stored for `id`.
    ///
    /// Panics if `id` is out of range: this mirrors the source's unchecked
    /// indexing and is a programming error, not a recoverable condition.
    fn get(&self, id: u32, d: u32) -> Vec<u32>;

    /// Drops all stored signatures, releasing owned buffers or truncating
    /// the backing file.
    fn clear(&mut self) -> Result<(), LshForestError>;

    /// Returns the raw, little-endian-packed bytes of every stored
    /// signature, in id order. Used by persistence to embed the store's
    /// contents in a dump.
    fn raw_bytes(&self) -> Vec<u8>;

    /// Rebuilds the store's contents from raw, little-endian-packed bytes
    /// produced by a prior call to [`raw_bytes`](Self::raw_bytes).
    fn load_raw_bytes(&mut self, bytes: &[u8], d: u32) -> Result<(), LshForestError>;
}

pub(crate) fn build(
    config: &StoreConfig,
) -> Result<Option<Box<dyn SignatureStore>>, LshForestError> {
    match config {
        StoreConfig::Disabled => Ok(None),
        StoreConfig::Memory => Ok(Some(Box::new(MemoryStore::new()))),
        StoreConfig::File(path) => {
            Ok(Some(Box::new(FileStore::open(path.clone())?)))
        }
    }
}
