//! # SkillMatch Similarity
//!
//! Exhaustive scoring of skill sets, used when no persisted index is involved.
//!
//! The hybrid score of a query against a candidate is the mean of the Jaccard
//! index of the two skill sets and the cosine similarity of their multi-hot
//! vectors. Both halves live in [0, 1], so does the blend.
//!
//! ## Example
//!
//! ```rust
//! use skillmatch_core::{CanonicalSkill, SkillSet, Vocabulary, VocabularyOrder};
//! use skillmatch_similarity::HybridRanker;
//!
//! let query: SkillSet = ["python", "machine learning"]
//!     .into_iter()
//!     .map(CanonicalSkill::from)
//!     .collect();
//! let job: SkillSet = ["python", "sql"].into_iter().map(CanonicalSkill::from).collect();
//!
//! let vocabulary = Vocabulary::build([&query, &job], VocabularyOrder::Insertion);
//! let ranker = HybridRanker::new(5);
//! let ranked = ranker
//!     .rank(&vocabulary, &query, vec![("job-1", &job)])
//!     .unwrap();
//!
//! assert_eq!(ranked[0].item, "job-1");
//! assert!((ranked[0].score.jaccard - 1.0 / 3.0).abs() < 1e-6);
//! ```

pub mod distance;
pub mod rerank;

pub use distance::{cosine, jaccard, HybridScore};
pub use rerank::{HybridRanker, RankedResult};
