//! # SkillMatch
//!
//! Skill-based job recommendation.
//!
//! Raw skill strings from resumes and job postings are mapped onto a curated
//! taxonomy, encoded as multi-hot vectors over a per-corpus vocabulary, and
//! matched either through a persisted HNSW index or by exhaustive hybrid
//! Jaccard/cosine scoring.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! skillmatch --data-dir ./data --index-dir ./indexes build
//! skillmatch --data-dir ./data --index-dir ./indexes recommend -c "Data Science" -s Python -s ML
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use skillmatch::prelude::*;
//! use std::sync::Arc;
//!
//! let taxonomy = Arc::new(Taxonomy::builtin().unwrap());
//! let config = RecommenderConfig::default();
//! let recommender = Recommender::open("./indexes", "./data", taxonomy, config).unwrap();
//!
//! let report = recommender.recommend_categories(&["Data Science", "Nursing"], &["Python", "ML"]);
//! for result in &report.results {
//!     for m in &result.recommendations.matches {
//!         println!("{}: {} ({:.3})", result.category, m.label, m.score);
//!     }
//! }
//! for skipped in &report.skipped {
//!     eprintln!("skipped {}: {}", skipped.category, skipped.reason);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `skillmatch-core` - Taxonomy, canonicalizer, vocabulary, encoder, HNSW index
//! - `skillmatch-similarity` - Jaccard, cosine and hybrid ranking
//! - `skillmatch-storage` - Index artifacts and category corpora on disk

pub mod recommender;

// Re-export core types
pub use skillmatch_core::{
    Backend, CanonicalSkill, Canonicalizer, CanonicalizerConfig, Entity, EntityId, Error,
    IndexConfig, Neighbor, Result, SimilarityIndex, SkillSet, SkillVector, SkilledEntity, Taxonomy,
    TextNormalizer, Vocabulary, VocabularyOrder,
};

// Re-export similarity
pub use skillmatch_similarity::{HybridRanker, HybridScore, RankedResult};

// Re-export storage
pub use skillmatch_storage::{ArtifactStore, CorpusStore, IndexArtifact, Manifest};

pub use recommender::{
    BuildReport, BuiltCategory, CandidateRecommendations, CategoryReport, CategoryResult, Match,
    QueryStatus, Recommendations, Recommender, RecommenderConfig, RetrievalMode, SkillEdge,
    SkippedCategory,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Backend, CanonicalSkill, Canonicalizer, Entity, EntityId, Error, IndexConfig, QueryStatus,
        Recommendations, Recommender, RecommenderConfig, Result, RetrievalMode, SkillSet, Taxonomy,
        Vocabulary,
    };
}
