//! Surface-form normalization shared by the taxonomy and the canonicalizer.
//!
//! Both sides must produce keys the same way, otherwise exact lookups silently
//! degrade into fuzzy ones.

use ahash::AHashSet;

/// Articles, prepositions and generic role words that carry no skill meaning
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "and", "the", "in", "on", "of", "for", "to", "with", "as", "by", "an", "be", "it", "at",
    "basics", "developer", "programmer", "programming", "development", "engineer", "using",
    "skills",
];

#[inline]
fn is_separator(c: char) -> bool {
    matches!(c, '&' | '/' | ',' | '-' | ':' | '.') || c.is_whitespace()
}

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stop_words: AHashSet<String>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl TextNormalizer {
    /// Default stop words plus `extra`
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stop_words: AHashSet<String> =
            DEFAULT_STOP_WORDS.iter().map(|w| (*w).to_string()).collect();
        stop_words.extend(extra.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        Self { stop_words }
    }

    /// This normalizer with `extra` stop words added
    pub fn with_stop_words<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stop_words = self.stop_words.clone();
        stop_words.extend(extra.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        Self { stop_words }
    }

    #[inline]
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Whether every word of `words` is already a stop word
    pub fn covers<I, S>(&self, words: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        words
            .into_iter()
            .all(|w| self.is_stop_word(&w.as_ref().trim().to_lowercase()))
    }

    /// Lowercase, map separator characters to single spaces, drop stop words
    pub fn tokens(&self, raw: &str) -> Vec<String> {
        let lowered = raw.trim().to_lowercase();
        let spaced: String = lowered
            .chars()
            .map(|c| if is_separator(c) { ' ' } else { c })
            .collect();
        spaced
            .split_whitespace()
            .filter(|t| !self.is_stop_word(t))
            .map(str::to_string)
            .collect()
    }

    /// Tokens re-joined without a separator ("Machine Learning" -> "machinelearning")
    pub fn compact_key(&self, raw: &str) -> String {
        self.tokens(raw).concat()
    }
}
