//! Exhaustive hybrid ranking
//!
//! Scores every candidate against the query and keeps the best `k`.

use crate::distance::HybridScore;
use skillmatch_core::{Result, SkillSet, Vocabulary};

/// One ranked candidate with its score breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult<T> {
    pub item: T,
    pub score: HybridScore,
    /// Position of the candidate in the input sequence
    pub position: usize,
}

/// Top-k hybrid ranker
#[derive(Debug, Clone, Copy)]
pub struct HybridRanker {
    top_k: usize,
}

impl HybridRanker {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Rank `candidates` against `query`, best first.
    ///
    /// Every candidate skill must be in `vocabulary`. Query skills outside it
    /// still count toward Jaccard but not toward cosine.
    /// Equal scores keep input order. Returns at most `top_k` results.
    pub fn rank<'a, T, I>(
        &self,
        vocabulary: &Vocabulary,
        query: &SkillSet,
        candidates: I,
    ) -> Result<Vec<RankedResult<T>>>
    where
        I: IntoIterator<Item = (T, &'a SkillSet)>,
    {
        let (query_vector, _) = vocabulary.encode_lossy(query);

        let mut results = Vec::new();
        for (position, (item, skills)) in candidates.into_iter().enumerate() {
            let vector = vocabulary.encode(skills)?;
            let score = HybridScore::compute(query, &query_vector, skills, &vector)?;
            results.push(RankedResult { item, score, position });
        }

        // stable sort keeps input order among equal scores
        results.sort_by(|a, b| b.score.score.total_cmp(&a.score.score));
        results.truncate(self.top_k);

        tracing::trace!(kept = results.len(), "ranked candidates");
        Ok(results)
    }
}

impl Default for HybridRanker {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmatch_core::{CanonicalSkill, Error, VocabularyOrder};

    fn set(names: &[&str]) -> SkillSet {
        names.iter().map(|n| CanonicalSkill::from(*n)).collect()
    }

    fn jobs() -> Vec<(&'static str, SkillSet)> {
        vec![
            ("backend", set(&["java", "sql"])),
            ("data", set(&["python", "sql", "pandas"])),
            ("ml", set(&["python", "machine learning"])),
            ("ml-copy", set(&["python", "machine learning"])),
            ("frontend", set(&["javascript", "css"])),
        ]
    }

    fn vocabulary(query: &SkillSet, jobs: &[(&str, SkillSet)]) -> Vocabulary {
        Vocabulary::build(
            std::iter::once(query).chain(jobs.iter().map(|(_, s)| s)),
            VocabularyOrder::Insertion,
        )
    }

    #[test]
    fn test_rank_orders_by_score() {
        let query = set(&["python", "machine learning"]);
        let jobs = jobs();
        let vocab = vocabulary(&query, &jobs);
        let ranked = HybridRanker::new(3)
            .rank(&vocab, &query, jobs.iter().map(|(id, s)| (*id, s)))
            .unwrap();

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].item, "ml");
        assert_eq!(ranked[1].item, "ml-copy");
        assert_eq!(ranked[2].item, "data");
        assert!(ranked.windows(2).all(|w| w[0].score.score >= w[1].score.score));
        for r in &ranked {
            assert!((0.0..=1.0).contains(&r.score.score));
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let query = set(&["go"]);
        let jobs = jobs();
        let vocab = vocabulary(&query, &jobs);
        let ranked = HybridRanker::new(10)
            .rank(&vocab, &query, jobs.iter().map(|(id, s)| (*id, s)))
            .unwrap();

        // nothing overlaps: all zero, input order
        let order: Vec<usize> = ranked.iter().map(|r| r.position).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_query_skill_outside_vocabulary_counts_for_jaccard_only() {
        let query = set(&["python", "rust"]);
        let job = set(&["python"]);
        let vocab = Vocabulary::sorted([&job]);
        let ranked = HybridRanker::default()
            .rank(&vocab, &query, vec![("job", &job)])
            .unwrap();
        assert!((ranked[0].score.jaccard - 0.5).abs() < 1e-6);
        assert!((ranked[0].score.cosine - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_candidates() {
        let query = set(&["python"]);
        let vocab = Vocabulary::sorted([&query]);
        let ranked = HybridRanker::default()
            .rank::<&str, _>(&vocab, &query, Vec::new())
            .unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_unknown_skill_is_an_error() {
        let query = set(&["python"]);
        let vocab = Vocabulary::sorted([&query]);
        let job = set(&["cobol"]);
        let err = HybridRanker::default()
            .rank(&vocab, &query, vec![("legacy", &job)])
            .unwrap_err();
        assert!(matches!(err, Error::VocabularyMismatch { .. }));
    }
}
