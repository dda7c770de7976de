//! Index snapshot persistence
//!
//! The snapshot format is a flat list of index entries plus the embedding
//! dimensionality, bincode-encoded and written atomically. Save and load are
//! explicit operations; nothing here runs on the query path.

use atomicwrites::{AllowOverwrite, AtomicFile};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tastevec_core::{Error, IndexConfig, IndexEntry, RecipeIndex, Result};

/// On-disk representation of a full index
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub name: String,
    pub dim: usize,
    pub entries: Vec<IndexEntry>,
}

impl IndexSnapshot {
    /// Capture the current state of an index
    #[must_use]
    pub fn capture(index: &RecipeIndex) -> Self {
        Self {
            name: index.name().to_string(),
            dim: index.dim(),
            entries: index.entries(),
        }
    }

    /// Rebuild an index from this snapshot
    pub fn into_index(self) -> Result<RecipeIndex> {
        let index = RecipeIndex::new(IndexConfig {
            name: self.name,
            dim: self.dim,
        });
        index.restore(self.entries)?;
        Ok(index)
    }
}

/// Serialize an index to a snapshot file, atomically.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// crash mid-save never clobbers the previous snapshot.
pub fn save_index<P: AsRef<Path>>(index: &RecipeIndex, path: P) -> Result<()> {
    let snapshot = IndexSnapshot::capture(index);
    let data = bincode::serialize(&snapshot).map_err(|e| Error::Serialization(e.to_string()))?;

    AtomicFile::new(path.as_ref(), AllowOverwrite)
        .write(|f| f.write_all(&data))
        .map_err(|e| Error::Storage(e.to_string()))?;
    Ok(())
}

/// Deserialize a snapshot file back into an index.
///
/// Search results over the restored index are identical to the saved one.
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<RecipeIndex> {
    let data = std::fs::read(path.as_ref())?;
    let snapshot: IndexSnapshot =
        bincode::deserialize(&data).map_err(|e| Error::Serialization(e.to_string()))?;
    snapshot.into_index()
}
