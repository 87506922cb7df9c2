use crate::encoder::{SkillVector, Vocabulary};
use crate::error::{Error, Result};
use crate::hnsw::{BinarySpace, DenseSpace, HnswIndex, HnswParams};
use serde::{Deserialize, Serialize};

/// Vector representation used by a [`SimilarityIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// L2-normalized floats, squared L2 distance
    #[default]
    Dense,
    /// Zero-padded packed bits, Hamming distance
    Binary,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Dense => write!(f, "dense"),
            Backend::Binary => write!(f, "binary"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dense" => Ok(Backend::Dense),
            "binary" => Ok(Backend::Binary),
            other => Err(Error::InvalidConfig(format!("unknown index backend '{}'", other))),
        }
    }
}

/// Index configuration. Unset search breadths fall back to per-backend defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: Backend,
    pub max_connections: usize,
    pub max_layers: usize,
    pub ef_construction: Option<usize>,
    pub ef_search: Option<usize>,
    pub seed: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let params = HnswParams::default();
        Self {
            backend: Backend::Dense,
            max_connections: params.max_connections,
            max_layers: params.max_layers,
            ef_construction: None,
            ef_search: None,
            seed: params.seed,
        }
    }
}

impl IndexConfig {
    pub fn dense() -> Self {
        Self::default()
    }

    pub fn binary() -> Self {
        Self {
            backend: Backend::Binary,
            ..Self::default()
        }
    }

    pub fn params(&self) -> HnswParams {
        let (ef_construction, ef_search) = match self.backend {
            Backend::Dense => (200, 32),
            Backend::Binary => (40, 16),
        };
        HnswParams {
            max_connections: self.max_connections,
            max_layers: self.max_layers,
            ef_construction: self.ef_construction.unwrap_or(ef_construction),
            ef_search: self.ef_search.unwrap_or(ef_search),
            seed: self.seed,
        }
    }
}

/// One search hit: internal row id and its distance to the query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Graph {
    Dense(HnswIndex<DenseSpace>),
    Binary(HnswIndex<BinarySpace>),
}

/// HNSW index over skill vectors of one vocabulary.
///
/// Row ids follow insertion order. The index keeps the fingerprint of the
/// vocabulary it was built against and refuses vectors from any other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityIndex {
    fingerprint: String,
    bits: usize,
    graph: Graph,
}

impl SimilarityIndex {
    pub fn new(config: &IndexConfig, vocabulary: &Vocabulary) -> Result<Self> {
        let params = config.params();
        let graph = match config.backend {
            Backend::Dense => Graph::Dense(HnswIndex::new(vocabulary.len(), params)?),
            Backend::Binary => Graph::Binary(HnswIndex::new(vocabulary.padded_len() / 8, params)?),
        };
        Ok(Self {
            fingerprint: vocabulary.fingerprint().to_string(),
            bits: vocabulary.len(),
            graph,
        })
    }

    /// Insert `vectors` in order; row `i` is `vectors[i]`
    pub fn build(
        config: &IndexConfig,
        vocabulary: &Vocabulary,
        vectors: &[SkillVector],
    ) -> Result<Self> {
        let mut index = Self::new(config, vocabulary)?;
        for vector in vectors {
            index.add(vector)?;
        }
        tracing::debug!(
            rows = index.len(),
            dim = index.bits,
            backend = %index.backend(),
            "built similarity index"
        );
        Ok(index)
    }

    fn check(&self, vector: &SkillVector) -> Result<()> {
        if vector.fingerprint() != self.fingerprint {
            return Err(Error::FingerprintMismatch {
                expected: self.fingerprint.clone(),
                actual: vector.fingerprint().to_string(),
            });
        }
        if vector.dim() != self.bits {
            return Err(Error::InvalidDimension {
                expected: self.bits,
                actual: vector.dim(),
            });
        }
        Ok(())
    }

    /// Append one vector. Returns its row id.
    ///
    /// A vector with no skills keeps its row id but is never returned by search.
    pub fn add(&mut self, vector: &SkillVector) -> Result<usize> {
        self.check(vector)?;
        let detached = vector.is_zero();
        match &mut self.graph {
            Graph::Dense(g) => {
                let dense = vector.to_dense().normalized();
                if detached {
                    g.insert_detached(dense.as_slice())
                } else {
                    g.insert(dense.as_slice())
                }
            }
            Graph::Binary(g) => {
                let packed = vector.pack();
                if detached {
                    g.insert_detached(packed.as_bytes())
                } else {
                    g.insert(packed.as_bytes())
                }
            }
        }
    }

    pub fn search(&self, query: &SkillVector, k: usize) -> Result<Vec<Neighbor>> {
        self.search_with_ef(query, k, None)
    }

    /// k nearest rows, ascending by distance; at most `min(k, len)` results.
    /// Rows added without skills are skipped.
    pub fn search_with_ef(
        &self,
        query: &SkillVector,
        k: usize,
        ef: Option<usize>,
    ) -> Result<Vec<Neighbor>> {
        self.check(query)?;
        let hits = match &self.graph {
            Graph::Dense(g) => g.search(query.to_dense().normalized().as_slice(), k, ef)?,
            Graph::Binary(g) => g.search(query.pack().as_bytes(), k, ef)?,
        };
        Ok(hits
            .into_iter()
            .map(|(row, distance)| Neighbor { row, distance })
            .collect())
    }

    pub fn backend(&self) -> Backend {
        match self.graph {
            Graph::Dense(_) => Backend::Dense,
            Graph::Binary(_) => Backend::Binary,
        }
    }

    pub fn params(&self) -> &HnswParams {
        match &self.graph {
            Graph::Dense(g) => g.params(),
            Graph::Binary(g) => g.params(),
        }
    }

    /// Fingerprint of the vocabulary the index was built against
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Vocabulary length (unpadded)
    pub fn dim(&self) -> usize {
        self.bits
    }

    pub fn len(&self) -> usize {
        match &self.graph {
            Graph::Dense(g) => g.len(),
            Graph::Binary(g) => g.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
