//! Set and vector similarity for skill profiles
//!
//! All functions return a similarity in [0.0, 1.0] where 1.0 means identical.

use serde::{Deserialize, Serialize};
use skillmatch_core::{Error, Result, SkillSet, SkillVector};

/// |a ∩ b| / |a ∪ b|; two empty sets score 0.0
pub fn jaccard(a: &SkillSet, b: &SkillSet) -> f32 {
    let union = a.union_len(b);
    if union == 0 {
        return 0.0;
    }
    a.intersection_len(b) as f32 / union as f32
}

/// Cosine of two multi-hot vectors of the same vocabulary.
///
/// 0.0 when either side has no bit set.
pub fn cosine(a: &SkillVector, b: &SkillVector) -> Result<f32> {
    if a.fingerprint() != b.fingerprint() {
        return Err(Error::FingerprintMismatch {
            expected: a.fingerprint().to_string(),
            actual: b.fingerprint().to_string(),
        });
    }

    // dot product of 0/1 vectors is the shared bit count
    let mut shared = 0usize;
    let mut ones_a = 0usize;
    let mut ones_b = 0usize;
    for (x, y) in a.bits().iter().zip(b.bits()) {
        shared += (*x && *y) as usize;
        ones_a += *x as usize;
        ones_b += *y as usize;
    }
    if ones_a == 0 || ones_b == 0 {
        return Ok(0.0);
    }
    let score = shared as f64 / ((ones_a as f64).sqrt() * (ones_b as f64).sqrt());
    Ok((score as f32).clamp(0.0, 1.0))
}

/// Blended score with its two components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridScore {
    /// Mean of `jaccard` and `cosine`
    pub score: f32,
    pub jaccard: f32,
    pub cosine: f32,
}

impl HybridScore {
    pub fn new(jaccard: f32, cosine: f32) -> Self {
        Self {
            score: (jaccard + cosine) / 2.0,
            jaccard,
            cosine,
        }
    }

    /// Score one candidate. Sets and vectors must describe the same profiles.
    pub fn compute(
        query_set: &SkillSet,
        query_vector: &SkillVector,
        candidate_set: &SkillSet,
        candidate_vector: &SkillVector,
    ) -> Result<Self> {
        let cos = cosine(query_vector, candidate_vector)?;
        Ok(Self::new(jaccard(query_set, candidate_set), cos))
    }
}
