use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The single standardized name for a skill concept
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalSkill(String);

impl CanonicalSkill {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalSkill {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalSkill {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CanonicalSkill {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Deduplicated skills of one entity.
///
/// Membership is what matters; the first-seen order is kept only so that
/// vocabularies built in insertion mode are reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CanonicalSkill>", into = "Vec<CanonicalSkill>")]
pub struct SkillSet {
    skills: Vec<CanonicalSkill>,
    members: AHashSet<CanonicalSkill>,
}

impl SkillSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the skill was not already present
    pub fn insert(&mut self, skill: CanonicalSkill) -> bool {
        if self.members.contains(&skill) {
            return false;
        }
        self.members.insert(skill.clone());
        self.skills.push(skill);
        true
    }

    #[inline]
    pub fn contains(&self, skill: &CanonicalSkill) -> bool {
        self.members.contains(skill)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalSkill> {
        self.skills.iter()
    }

    pub fn intersection_len(&self, other: &SkillSet) -> usize {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.iter().filter(|s| large.contains(s)).count()
    }

    pub fn union_len(&self, other: &SkillSet) -> usize {
        self.len() + other.len() - self.intersection_len(other)
    }
}

impl PartialEq for SkillSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|s| other.contains(s))
    }
}

impl Eq for SkillSet {}

impl FromIterator<CanonicalSkill> for SkillSet {
    fn from_iter<I: IntoIterator<Item = CanonicalSkill>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<CanonicalSkill> for SkillSet {
    fn extend<I: IntoIterator<Item = CanonicalSkill>>(&mut self, iter: I) {
        for skill in iter {
            self.insert(skill);
        }
    }
}

impl From<Vec<CanonicalSkill>> for SkillSet {
    fn from(skills: Vec<CanonicalSkill>) -> Self {
        skills.into_iter().collect()
    }
}

impl From<SkillSet> for Vec<CanonicalSkill> {
    fn from(set: SkillSet) -> Self {
        set.skills
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a CanonicalSkill;
    type IntoIter = std::slice::Iter<'a, CanonicalSkill>;

    fn into_iter(self) -> Self::IntoIter {
        self.skills.iter()
    }
}
