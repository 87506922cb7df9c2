//! # SkillMatch Core
//!
//! Core library for the SkillMatch recommender.
//!
//! This crate provides the building blocks shared by every retrieval mode:
//!
//! - [`Taxonomy`] - Canonical skills and their surface forms
//! - [`Canonicalizer`] - Raw skill text to canonical skills (exact, then fuzzy)
//! - [`Vocabulary`] - Ordered skill list with a stable fingerprint
//! - [`SkillVector`] - Multi-hot encoding of a skill set
//! - [`SimilarityIndex`] - HNSW nearest-neighbour index over skill vectors
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use skillmatch_core::{Canonicalizer, IndexConfig, SimilarityIndex, Taxonomy, Vocabulary};
//!
//! let taxonomy = Taxonomy::builder()
//!     .synonym("py", "python")
//!     .synonym("ml", "machine learning")
//!     .skill("sql", Vec::<String>::new())
//!     .build()
//!     .unwrap();
//! let canonicalizer = Canonicalizer::new(Arc::new(taxonomy));
//!
//! let jobs = vec![
//!     canonicalizer.canonicalize_all(&["Python", "SQL"]),
//!     canonicalizer.canonicalize_all(&["ML"]),
//! ];
//! let vocabulary = Vocabulary::sorted(&jobs);
//! let vectors = vocabulary.encode_all(&jobs).unwrap();
//! let index = SimilarityIndex::build(&IndexConfig::default(), &vocabulary, &vectors).unwrap();
//!
//! let (query, _unknown) = vocabulary.encode_lossy(&canonicalizer.canonicalize_all(&["py"]));
//! let hits = index.search(&query, 1).unwrap();
//! assert_eq!(hits[0].row, 0);
//! ```

pub mod canonicalize;
pub mod encoder;
pub mod entity;
pub mod error;
pub mod fuzzy;
pub mod hnsw;
pub mod index;
pub mod metric;
pub mod normalize;
pub mod skill;
pub mod taxonomy;
pub mod vector;

pub use canonicalize::{Canonicalizer, CanonicalizerConfig, DEFAULT_MATCH_THRESHOLD};
pub use encoder::{PackedVector, SkillVector, Vocabulary, VocabularyBuilder, VocabularyOrder};
pub use entity::{Entity, EntityId, SkilledEntity};
pub use error::{Error, Result};
pub use hnsw::{BinarySpace, DenseSpace, HnswIndex, HnswParams, Space};
pub use index::{Backend, IndexConfig, Neighbor, SimilarityIndex};
pub use normalize::TextNormalizer;
pub use skill::{CanonicalSkill, SkillSet};
pub use taxonomy::{SkillEntry, Taxonomy, TaxonomyBuilder, TaxonomyFile};
pub use vector::Vector;
