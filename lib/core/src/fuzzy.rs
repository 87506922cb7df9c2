//! Fuzzy string matching with a fixed tie-break policy.

/// Best candidate found by [`best_match`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub candidate: &'a str,
    /// Similarity in [0, 100]
    pub score: f64,
}

/// Indel similarity in [0, 100], `200 * lcs / (len(a) + len(b))` over chars.
/// 100 means identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(&a, &b) as f64 / total as f64
}

/// Length of the longest common subsequence, one DP row at a time
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

/// Highest-scoring candidate for `query`.
///
/// On equal scores the lexicographically smallest candidate wins, independent
/// of iteration order.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<FuzzyMatch<'a>> = None;
    for candidate in candidates {
        let score = ratio(query, candidate);
        let better = match &best {
            None => true,
            Some(b) => score > b.score || (score == b.score && candidate < b.candidate),
        };
        if better {
            best = Some(FuzzyMatch { candidate, score });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(ratio("python", "python"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert!(ratio("pyhton", "python") > 60.0);
    }

    #[test]
    fn test_ratio_counts_insertions_and_deletions() {
        // one substitution is a deletion plus an insertion
        assert_eq!(ratio("scala", "scalo"), 80.0);
        assert!((ratio("javascripting", "javascript") - 2000.0 / 23.0).abs() < 1e-9);
        let aws = ratio("amazonwebservices(aws)", "amazonwebservices");
        assert!((aws - 3400.0 / 39.0).abs() < 1e-9);
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("", "sql"), 0.0);
    }

    #[test]
    fn test_ratio_is_symmetric() {
        for (a, b) in [("pyhton", "python"), ("c++", "cpp"), ("kubernets", "kubernetes")] {
            assert_eq!(ratio(a, b), ratio(b, a));
        }
    }

    #[test]
    fn test_best_match_picks_highest() {
        let m = best_match("pythn", ["java", "python", "php"]).unwrap();
        assert_eq!(m.candidate, "python");
        assert!(m.score > 80.0);
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        // "ab" is one edit away from both
        let forward = best_match("ab", ["ac", "aa"]).unwrap();
        let backward = best_match("ab", ["aa", "ac"]).unwrap();
        assert_eq!(forward.candidate, "aa");
        assert_eq!(backward.candidate, "aa");
    }

    #[test]
    fn test_no_candidates() {
        assert!(best_match("python", std::iter::empty()).is_none());
    }
}
