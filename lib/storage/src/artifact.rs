//! Persisted per-category index artifacts
//!
//! An artifact is three files in the index directory:
//!
//! ```text
//! <category>_hnsw.index      bincode SimilarityIndex
//! <category>_mapping.json    row -> entity mapping plus the vocabulary
//! <category>_manifest.json   checksums of both, written last
//! ```
//!
//! A crash between writes leaves a manifest that does not match the data
//! files, which is reported as [`Error::CorruptArtifact`] on load.

use crate::{safe_category_name, sha256_hex, write_atomic};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use skillmatch_core::{
    Backend, EntityId, Error, IndexConfig, Result, SimilarityIndex, SkilledEntity, Vocabulary,
    VocabularyOrder,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const FORMAT_VERSION: u32 = 1;

const INDEX_SUFFIX: &str = "_hnsw.index";
const MAPPING_SUFFIX: &str = "_mapping.json";
const MANIFEST_SUFFIX: &str = "_manifest.json";

/// External identity of one index row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedEntity {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MappedEntity {
    pub fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.id.to_string())
    }
}

impl From<&SkilledEntity> for MappedEntity {
    fn from(e: &SkilledEntity) -> Self {
        Self {
            id: e.id.clone(),
            title: e.title.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MappingFile {
    category: String,
    vocabulary: Vocabulary,
    entities: Vec<MappedEntity>,
}

/// Description of a persisted artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub category: String,
    pub backend: Backend,
    pub fingerprint: String,
    pub rows: usize,
    pub index_sha256: String,
    pub mapping_sha256: String,
    pub created_at: DateTime<Utc>,
}

/// Index, vocabulary and row mapping of one category
#[derive(Debug, Clone)]
pub struct IndexArtifact {
    category: String,
    vocabulary: Vocabulary,
    index: SimilarityIndex,
    entities: Vec<MappedEntity>,
}

impl IndexArtifact {
    pub fn new(
        category: impl Into<String>,
        vocabulary: Vocabulary,
        index: SimilarityIndex,
        entities: Vec<MappedEntity>,
    ) -> Result<Self> {
        let category = category.into();
        if index.fingerprint() != vocabulary.fingerprint() {
            return Err(Error::FingerprintMismatch {
                expected: vocabulary.fingerprint().to_string(),
                actual: index.fingerprint().to_string(),
            });
        }
        if index.len() != entities.len() {
            return Err(Error::CorruptArtifact(format!(
                "category '{}': {} index rows but {} mapped entities",
                category,
                index.len(),
                entities.len()
            )));
        }
        Ok(Self {
            category,
            vocabulary,
            index,
            entities,
        })
    }

    /// Encode `entities` against their own sorted vocabulary and index them in order
    pub fn build(
        category: impl Into<String>,
        entities: &[SkilledEntity],
        config: &IndexConfig,
    ) -> Result<Self> {
        let category = category.into();
        let vocabulary =
            Vocabulary::build(entities.iter().map(|e| &e.skills), VocabularyOrder::Sorted);
        let vectors = vocabulary.encode_all(entities.iter().map(|e| &e.skills))?;
        let index = SimilarityIndex::build(config, &vocabulary, &vectors)?;
        info!(
            category = %category,
            rows = index.len(),
            skills = vocabulary.len(),
            backend = %index.backend(),
            "built index artifact"
        );
        Self::new(category, vocabulary, index, entities.iter().map(MappedEntity::from).collect())
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    pub fn entities(&self) -> &[MappedEntity] {
        &self.entities
    }

    /// Entity stored at `row`
    pub fn entity(&self, row: usize) -> Option<&MappedEntity> {
        self.entities.get(row)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// File locations of one category's artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub index: PathBuf,
    pub mapping: PathBuf,
    pub manifest: PathBuf,
}

/// Reads and writes index artifacts under one directory, caching loaded ones
pub struct ArtifactStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<IndexArtifact>>>,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn paths(&self, category: &str) -> ArtifactPaths {
        let safe = safe_category_name(category);
        ArtifactPaths {
            index: self.dir.join(format!("{}{}", safe, INDEX_SUFFIX)),
            mapping: self.dir.join(format!("{}{}", safe, MAPPING_SUFFIX)),
            manifest: self.dir.join(format!("{}{}", safe, MANIFEST_SUFFIX)),
        }
    }

    /// A manifest exists for `category`; says nothing about its validity
    pub fn exists(&self, category: &str) -> bool {
        self.paths(category).manifest.exists()
    }

    /// Persist `artifact`, replacing any previous one for its category
    pub fn save(&self, artifact: IndexArtifact) -> Result<Arc<IndexArtifact>> {
        let paths = self.paths(&artifact.category);

        let index_bytes = bincode::serialize(&artifact.index)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let mapping = MappingFile {
            category: artifact.category.clone(),
            vocabulary: artifact.vocabulary.clone(),
            entities: artifact.entities.clone(),
        };
        let mapping_bytes = serde_json::to_vec_pretty(&mapping)?;

        let manifest = Manifest {
            format_version: FORMAT_VERSION,
            category: artifact.category.clone(),
            backend: artifact.index.backend(),
            fingerprint: artifact.vocabulary.fingerprint().to_string(),
            rows: artifact.len(),
            index_sha256: sha256_hex(&index_bytes),
            mapping_sha256: sha256_hex(&mapping_bytes),
            created_at: Utc::now(),
        };
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;

        write_atomic(&paths.index, &index_bytes)?;
        write_atomic(&paths.mapping, &mapping_bytes)?;
        // manifest last: its presence marks a complete artifact
        write_atomic(&paths.manifest, &manifest_bytes)?;

        info!(
            category = %artifact.category,
            rows = manifest.rows,
            path = %paths.index.display(),
            "saved index artifact"
        );

        let artifact = Arc::new(artifact);
        self.cache
            .write()
            .insert(artifact.category.clone(), artifact.clone());
        Ok(artifact)
    }

    /// Load the artifact of `category`, from cache when already loaded.
    ///
    /// Missing files give [`Error::IndexUnavailable`]; files that do not agree
    /// with the manifest give [`Error::CorruptArtifact`].
    pub fn load(&self, category: &str) -> Result<Arc<IndexArtifact>> {
        if let Some(artifact) = self.cache.read().get(category) {
            return Ok(artifact.clone());
        }

        let artifact = Arc::new(self.read_from_disk(category)?);
        self.cache
            .write()
            .insert(category.to_string(), artifact.clone());
        Ok(artifact)
    }

    pub fn manifest(&self, category: &str) -> Result<Manifest> {
        let paths = self.paths(category);
        let bytes = read_required(&paths.manifest, category)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| corrupt(category, format!("unreadable manifest: {}", e)))
    }

    fn read_from_disk(&self, category: &str) -> Result<IndexArtifact> {
        let paths = self.paths(category);
        let manifest = self.manifest(category)?;
        let index_bytes = read_required(&paths.index, category)?;
        let mapping_bytes = read_required(&paths.mapping, category)?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(corrupt(
                category,
                format!("unsupported format version {}", manifest.format_version),
            ));
        }
        if sha256_hex(&index_bytes) != manifest.index_sha256 {
            return Err(corrupt(category, "index checksum mismatch"));
        }
        if sha256_hex(&mapping_bytes) != manifest.mapping_sha256 {
            return Err(corrupt(category, "mapping checksum mismatch"));
        }

        let index: SimilarityIndex = bincode::deserialize(&index_bytes)
            .map_err(|e| corrupt(category, format!("unreadable index: {}", e)))?;
        let mapping: MappingFile = serde_json::from_slice(&mapping_bytes)
            .map_err(|e| corrupt(category, format!("unreadable mapping: {}", e)))?;

        if mapping.vocabulary.fingerprint() != manifest.fingerprint
            || index.fingerprint() != manifest.fingerprint
        {
            return Err(corrupt(category, "vocabulary fingerprint mismatch"));
        }
        if index.len() != manifest.rows || mapping.entities.len() != manifest.rows {
            return Err(corrupt(
                category,
                format!(
                    "expected {} rows, index has {} and mapping has {}",
                    manifest.rows,
                    index.len(),
                    mapping.entities.len()
                ),
            ));
        }

        debug!(category, rows = manifest.rows, "loaded index artifact");
        IndexArtifact::new(mapping.category, mapping.vocabulary, index, mapping.entities)
    }

    /// Drop `category` from the cache so the next load reads disk again
    pub fn evict(&self, category: &str) {
        self.cache.write().remove(category);
    }

    /// Delete the artifact files of `category`. Returns whether a manifest existed.
    pub fn remove(&self, category: &str) -> Result<bool> {
        self.evict(category);
        let paths = self.paths(category);
        let existed = paths.manifest.exists();
        // manifest first so a partial delete never looks complete
        for path in [&paths.manifest, &paths.index, &paths.mapping] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(existed)
    }

    /// Categories with a manifest on disk, sorted by file name.
    ///
    /// Names are read back from the manifests, so sanitised characters are restored.
    pub fn categories(&self) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(stem) = name.strip_suffix(MANIFEST_SUFFIX) {
                found.push(stem.to_string());
            }
        }
        found.sort();

        let mut categories = Vec::with_capacity(found.len());
        for stem in found {
            let path = self.dir.join(format!("{}{}", stem, MANIFEST_SUFFIX));
            let category = std::fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<Manifest>(&bytes).ok())
                .map(|m| m.category)
                .unwrap_or(stem);
            categories.push(category);
        }
        Ok(categories)
    }
}

fn read_required(path: &Path, category: &str) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::IndexUnavailable(format!(
            "category '{}': missing {}",
            category,
            path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}

fn corrupt(category: &str, reason: impl std::fmt::Display) -> Error {
    Error::CorruptArtifact(format!("category '{}': {}", category, reason))
}
