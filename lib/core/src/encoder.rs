//! Multi-hot encoding of skill sets over a shared [`Vocabulary`].
//!
//! Bit `i` of a [`SkillVector`] is set iff `vocabulary[i]` belongs to the
//! encoded skill set. Vectors remember the fingerprint of the vocabulary they
//! were built against so that vectors from different spaces are never mixed.

use crate::error::{Error, Result};
use crate::skill::{CanonicalSkill, SkillSet};
use crate::vector::Vector;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How a vocabulary orders its skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyOrder {
    /// Lexicographic; reproducible regardless of corpus order
    #[default]
    Sorted,
    /// First-seen order; later additions never move earlier skills
    Insertion,
}

/// Ordered, deduplicated list of canonical skills defining the vector space
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "VocabularyData", into = "VocabularyData")]
pub struct Vocabulary {
    skills: Vec<CanonicalSkill>,
    positions: AHashMap<CanonicalSkill, usize>,
    fingerprint: String,
}

#[derive(Serialize, Deserialize)]
struct VocabularyData {
    skills: Vec<CanonicalSkill>,
}

impl From<VocabularyData> for Vocabulary {
    fn from(data: VocabularyData) -> Self {
        Vocabulary::from_ordered(data.skills)
    }
}

impl From<Vocabulary> for VocabularyData {
    fn from(v: Vocabulary) -> Self {
        VocabularyData { skills: v.skills }
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.skills == other.skills
    }
}

impl Vocabulary {
    /// Union of all skills in `sets`, ordered according to `order`
    pub fn build<'a, I>(sets: I, order: VocabularyOrder) -> Self
    where
        I: IntoIterator<Item = &'a SkillSet>,
    {
        let mut builder = VocabularyBuilder::new(order);
        for set in sets {
            builder.add_set(set);
        }
        builder.finish()
    }

    pub fn sorted<'a, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a SkillSet>,
    {
        Self::build(sets, VocabularyOrder::Sorted)
    }

    /// Skills taken as given; duplicates after the first occurrence are ignored
    pub fn from_ordered(skills: Vec<CanonicalSkill>) -> Self {
        let mut unique = Vec::with_capacity(skills.len());
        let mut positions = AHashMap::with_capacity(skills.len());
        for skill in skills {
            if !positions.contains_key(&skill) {
                positions.insert(skill.clone(), unique.len());
                unique.push(skill);
            }
        }
        let fingerprint = fingerprint_of(&unique);
        Self {
            skills: unique,
            positions,
            fingerprint,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    #[inline]
    pub fn position(&self, skill: &CanonicalSkill) -> Option<usize> {
        self.positions.get(skill).copied()
    }

    #[inline]
    pub fn contains(&self, skill: &CanonicalSkill) -> bool {
        self.positions.contains_key(skill)
    }

    pub fn get(&self, idx: usize) -> Option<&CanonicalSkill> {
        self.skills.get(idx)
    }

    pub fn skills(&self) -> &[CanonicalSkill] {
        &self.skills
    }

    /// SHA-256 over the ordered skill list; identifies the vector space
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Bit length of packed vectors over this vocabulary
    #[inline]
    pub fn padded_len(&self) -> usize {
        padded_bit_len(self.len())
    }

    /// Multi-hot vector for `set`; every member must be in the vocabulary
    pub fn encode(&self, set: &SkillSet) -> Result<SkillVector> {
        let mut bits = vec![false; self.len()];
        for skill in set {
            let idx = self.position(skill).ok_or_else(|| Error::VocabularyMismatch {
                skill: skill.to_string(),
                fingerprint: self.fingerprint.clone(),
            })?;
            bits[idx] = true;
        }
        Ok(SkillVector {
            bits,
            fingerprint: self.fingerprint.clone(),
        })
    }

    /// Like [`encode`](Self::encode) but skills outside the vocabulary are
    /// skipped and returned instead of failing
    pub fn encode_lossy(&self, set: &SkillSet) -> (SkillVector, Vec<CanonicalSkill>) {
        let mut bits = vec![false; self.len()];
        let mut dropped = Vec::new();
        for skill in set {
            match self.position(skill) {
                Some(idx) => bits[idx] = true,
                None => dropped.push(skill.clone()),
            }
        }
        let vector = SkillVector {
            bits,
            fingerprint: self.fingerprint.clone(),
        };
        (vector, dropped)
    }

    /// Encode many sets; fails on the first set holding an unknown skill
    pub fn encode_all<'a, I>(&self, sets: I) -> Result<Vec<SkillVector>>
    where
        I: IntoIterator<Item = &'a SkillSet>,
    {
        sets.into_iter().map(|s| self.encode(s)).collect()
    }
}

fn fingerprint_of(skills: &[CanonicalSkill]) -> String {
    let mut hasher = Sha256::new();
    for skill in skills {
        hasher.update(skill.as_str().as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

/// Next multiple of 8
#[inline]
pub fn padded_bit_len(bits: usize) -> usize {
    bits.div_ceil(8) * 8
}

/// Incrementally collects skills into a [`Vocabulary`]
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    order: VocabularyOrder,
    skills: Vec<CanonicalSkill>,
    seen: ahash::AHashSet<CanonicalSkill>,
}

impl VocabularyBuilder {
    pub fn new(order: VocabularyOrder) -> Self {
        Self {
            order,
            skills: Vec::new(),
            seen: ahash::AHashSet::new(),
        }
    }

    pub fn add(&mut self, skill: &CanonicalSkill) {
        if self.seen.insert(skill.clone()) {
            self.skills.push(skill.clone());
        }
    }

    pub fn add_set(&mut self, set: &SkillSet) {
        for skill in set {
            self.add(skill);
        }
    }

    pub fn finish(mut self) -> Vocabulary {
        if self.order == VocabularyOrder::Sorted {
            self.skills.sort();
        }
        Vocabulary::from_ordered(self.skills)
    }
}

/// Multi-hot encoding of one skill set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillVector {
    bits: Vec<bool>,
    fingerprint: String,
}

impl SkillVector {
    #[inline]
    pub fn dim(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Fingerprint of the vocabulary this vector was encoded against
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    #[inline]
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// No skill of the set is present in the vocabulary
    #[inline]
    pub fn is_zero(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }

    /// 0.0 / 1.0 floats, one per vocabulary position
    pub fn to_dense(&self) -> Vector {
        Vector::new(self.bits.iter().map(|b| if *b { 1.0 } else { 0.0 }).collect())
    }

    /// Bits right-padded with zeros to a multiple of 8
    pub fn padded_bits(&self) -> Vec<bool> {
        let mut bits = self.bits.clone();
        bits.resize(padded_bit_len(self.bits.len()), false);
        bits
    }

    /// Pack 8 bits per byte, most significant bit first
    pub fn pack(&self) -> PackedVector {
        let bit_len = padded_bit_len(self.bits.len());
        let mut bytes = vec![0u8; bit_len / 8];
        for (i, bit) in self.bits.iter().enumerate() {
            if *bit {
                bytes[i / 8] |= 0x80 >> (i % 8);
            }
        }
        PackedVector { bytes, bit_len }
    }

    /// Cosine similarity of two multi-hot vectors
    pub fn cosine(&self, other: &SkillVector) -> f32 {
        self.to_dense().cosine_similarity(&other.to_dense())
    }
}

/// Byte-packed, zero-padded form of a [`SkillVector`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedVector {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl PackedVector {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Always a multiple of 8
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn unpack(&self) -> Vec<bool> {
        (0..self.bit_len)
            .map(|i| self.bytes[i / 8] & (0x80 >> (i % 8)) != 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> SkillSet {
        names.iter().map(|n| CanonicalSkill::from(*n)).collect()
    }

    #[test]
    fn test_sorted_vocabulary_is_order_independent() {
        let a = set(&["sql", "python"]);
        let b = set(&["java", "python"]);
        let v1 = Vocabulary::sorted([&a, &b]);
        let v2 = Vocabulary::sorted([&b, &a]);
        assert_eq!(v1, v2);
        assert_eq!(v1.fingerprint(), v2.fingerprint());
        let names: Vec<&str> = v1.skills().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["java", "python", "sql"]);
    }

    #[test]
    fn test_insertion_vocabulary_keeps_first_seen() {
        let a = set(&["sql", "python"]);
        let query = set(&["rust", "sql"]);
        let v = Vocabulary::build([&a, &query], VocabularyOrder::Insertion);
        let names: Vec<&str> = v.skills().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["sql", "python", "rust"]);
    }

    #[test]
    fn test_encode_deterministic() {
        let corpus = set(&["python", "sql", "java"]);
        let vocab = Vocabulary::sorted([&corpus]);
        let s = set(&["sql", "python"]);
        let first = vocab.encode(&s).unwrap();
        let second = vocab.encode(&s).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.bits(), &[false, true, true]);
        assert_eq!(first.fingerprint(), vocab.fingerprint());
    }

    #[test]
    fn test_encode_unknown_skill_is_mismatch() {
        let vocab = Vocabulary::sorted([&set(&["python"])]);
        let err = vocab.encode(&set(&["python", "cobol"])).unwrap_err();
        assert!(matches!(err, Error::VocabularyMismatch { .. }));
    }

    #[test]
    fn test_encode_lossy_reports_dropped() {
        let vocab = Vocabulary::sorted([&set(&["python", "sql"])]);
        let (v, dropped) = vocab.encode_lossy(&set(&["cobol", "sql"]));
        assert_eq!(v.count_ones(), 1);
        assert_eq!(dropped, vec![CanonicalSkill::from("cobol")]);

        let (zero, dropped) = vocab.encode_lossy(&set(&["cobol"]));
        assert!(zero.is_zero());
        assert_eq!(dropped.len(), 1);
    }

    #[test]
    fn test_empty_set_encodes_to_zero() {
        let vocab = Vocabulary::sorted([&set(&["python"])]);
        assert!(vocab.encode(&SkillSet::new()).unwrap().is_zero());
    }

    #[test]
    fn test_padding_invariant() {
        for n in 0..20usize {
            let names: Vec<String> = (0..n).map(|i| format!("skill{:02}", i)).collect();
            let all: SkillSet = names.iter().map(|s| CanonicalSkill::from(s.as_str())).collect();
            let vocab = Vocabulary::sorted([&all]);
            let packed = vocab.encode(&all).unwrap().pack();
            assert_eq!(packed.bit_len() % 8, 0);
            assert_eq!(packed.bit_len(), vocab.padded_len());
            let unpacked = packed.unpack();
            assert!(unpacked[n..].iter().all(|b| !*b), "padding bits must be zero for n={}", n);
            assert!(unpacked[..n].iter().all(|b| *b));
        }
    }

    #[test]
    fn test_pack_bit_order_msb_first() {
        let vocab = Vocabulary::from_ordered(
            ["a", "b", "c", "d", "e", "f", "g", "h", "i"]
                .iter()
                .map(|s| CanonicalSkill::from(*s))
                .collect(),
        );
        let packed = vocab.encode(&set(&["a", "c", "i"])).unwrap().pack();
        assert_eq!(packed.as_bytes(), &[0b1010_0000, 0b1000_0000]);
        assert_eq!(packed.bit_len(), 16);
    }

    #[test]
    fn test_vocabulary_serde_restores_positions() {
        let vocab = Vocabulary::sorted([&set(&["python", "sql"])]);
        let json = serde_json::to_string(&vocab).unwrap();
        let restored: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, vocab);
        assert_eq!(restored.fingerprint(), vocab.fingerprint());
        assert_eq!(restored.position(&CanonicalSkill::from("sql")), Some(1));
    }

    #[test]
    fn test_multi_hot_cosine() {
        let vocab = Vocabulary::from_ordered(
            ["python", "machine learning", "sql"]
                .iter()
                .map(|s| CanonicalSkill::from(*s))
                .collect(),
        );
        let candidate = vocab.encode(&set(&["python", "machine learning"])).unwrap();
        let job = vocab.encode(&set(&["python", "sql"])).unwrap();
        assert!((candidate.cosine(&job) - 0.5).abs() < 1e-6);
    }
}
