//! # SkillMatch Storage
//!
//! File-backed persistence for SkillMatch.
//!
//! - [`ArtifactStore`] - per-category index artifacts (HNSW graph, row mapping,
//!   vocabulary) guarded by a checksummed manifest
//! - [`CorpusStore`] - per-category corpora of raw entities (`<category>_subset.json`)

pub mod artifact;
pub mod corpus;

pub use artifact::{
    ArtifactPaths, ArtifactStore, IndexArtifact, Manifest, MappedEntity, FORMAT_VERSION,
};
pub use corpus::CorpusStore;

use atomicwrites::{AllowOverwrite, AtomicFile};
use sha2::{Digest, Sha256};
use skillmatch_core::{Error, Result};
use std::io::Write;
use std::path::Path;

/// File-system safe form of a category name: `<>:"/\|?*` become `_`
pub fn safe_category_name(category: &str) -> String {
    category
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect()
}

/// Replace `path` with `data` through a temporary file and rename
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    AtomicFile::new(path, AllowOverwrite)
        .write(|f| f.write_all(data))
        .map_err(|e| Error::Io(std::io::Error::other(format!("{}: {}", path.display(), e))))
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
