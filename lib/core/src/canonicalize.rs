use crate::entity::{Entity, SkilledEntity};
use crate::error::Result;
use crate::fuzzy::best_match;
use crate::normalize::TextNormalizer;
use crate::skill::{CanonicalSkill, SkillSet};
use crate::taxonomy::Taxonomy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Scores must be strictly above this to count as a match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalizerConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Stop words on top of the built-in list. A taxonomy whose normalizer lacks
    /// them is re-keyed when the canonicalizer is created.
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

fn default_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}

impl CanonicalizerConfig {
    pub fn normalizer(&self) -> TextNormalizer {
        TextNormalizer::new(&self.extra_stop_words)
    }
}

impl Default for CanonicalizerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            extra_stop_words: Vec::new(),
        }
    }
}

/// Maps raw skill text onto the canonical skills of a [`Taxonomy`]
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    taxonomy: Arc<Taxonomy>,
    config: CanonicalizerConfig,
}

impl Canonicalizer {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            taxonomy,
            config: CanonicalizerConfig::default(),
        }
    }

    pub fn with_config(taxonomy: Arc<Taxonomy>, config: CanonicalizerConfig) -> Result<Self> {
        let taxonomy = if taxonomy.normalizer().covers(&config.extra_stop_words) {
            taxonomy
        } else {
            debug!(
                stop_words = ?config.extra_stop_words,
                "re-keying taxonomy for extra stop words"
            );
            let normalizer = taxonomy.normalizer().with_stop_words(&config.extra_stop_words);
            Arc::new(taxonomy.with_normalizer(normalizer)?)
        };
        Ok(Self { taxonomy, config })
    }

    pub fn config(&self) -> &CanonicalizerConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Canonical skills for one raw token or phrase, deduplicated, first-seen order.
    ///
    /// The whole phrase is tried first as a compact key; only when that fails is
    /// every remaining token matched on its own. Unmatched tokens are dropped.
    pub fn canonicalize(&self, raw: &str) -> Vec<CanonicalSkill> {
        let tokens = self.taxonomy.normalizer().tokens(raw);
        if tokens.is_empty() {
            return Vec::new();
        }

        let compact = tokens.concat();
        if let Some(skill) = self.match_key(&compact) {
            return vec![skill.clone()];
        }

        let mut out: Vec<CanonicalSkill> = Vec::with_capacity(tokens.len());
        for token in &tokens {
            match self.match_key(token) {
                Some(skill) => {
                    if !out.contains(skill) {
                        out.push(skill.clone());
                    }
                }
                None => debug!(token = %token, phrase = raw, "dropping unmatched skill token"),
            }
        }
        out
    }

    /// Exact lookup, then best fuzzy surface form above the threshold
    fn match_key(&self, key: &str) -> Option<&CanonicalSkill> {
        if let Some(skill) = self.taxonomy.lookup(key) {
            return Some(skill);
        }
        let found = best_match(key, self.taxonomy.surface_forms())?;
        if found.score > self.config.threshold {
            self.taxonomy.lookup(found.candidate)
        } else {
            None
        }
    }

    /// All raw tokens of one entity folded into a single skill set
    pub fn canonicalize_all<S: AsRef<str>>(&self, raw_skills: &[S]) -> SkillSet {
        raw_skills
            .iter()
            .flat_map(|raw| self.canonicalize(raw.as_ref()))
            .collect()
    }

    pub fn canonicalize_entity(&self, entity: &Entity) -> SkilledEntity {
        SkilledEntity::new(
            entity.id.clone(),
            entity.title.clone(),
            self.canonicalize_all(&entity.skills),
        )
    }

    /// Canonicalize many entities in parallel; output order follows input order
    pub fn canonicalize_entities(&self, entities: &[Entity]) -> Vec<SkilledEntity> {
        entities
            .par_iter()
            .map(|e| self.canonicalize_entity(e))
            .collect()
    }
}
