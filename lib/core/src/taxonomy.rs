//! Curated skill vocabulary and its synonym table.
//!
//! A [`Taxonomy`] is built once and never mutated. Surface forms are stored
//! under their compact normalized key, and every canonical name is also a
//! surface form of itself so that it always matches verbatim.

use crate::error::{Error, Result};
use crate::normalize::TextNormalizer;
use crate::skill::CanonicalSkill;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_TAXONOMY: &str = include_str!("../resources/taxonomy.json");

/// On-disk taxonomy document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyFile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub skills: Vec<SkillEntry>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEntry {
    pub canonical: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    /// Compact surface key -> canonical skill. Sorted so fuzzy scans are reproducible.
    synonyms: BTreeMap<String, CanonicalSkill>,
    canonical: Vec<CanonicalSkill>,
    normalizer: TextNormalizer,
    /// Entries as given, kept so the table can be re-keyed under another normalizer
    entries: Vec<(String, Vec<String>)>,
}

impl Taxonomy {
    pub fn builder() -> TaxonomyBuilder {
        TaxonomyBuilder::default()
    }

    /// The taxonomy shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::builtin_with(TextNormalizer::default())
    }

    pub fn builtin_with(normalizer: TextNormalizer) -> Result<Self> {
        Self::from_json_str_with(BUILTIN_TAXONOMY, normalizer)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_str_with(json, TextNormalizer::default())
    }

    pub fn from_json_str_with(json: &str, normalizer: TextNormalizer) -> Result<Self> {
        let file: TaxonomyFile = serde_json::from_str(json)
            .map_err(|e| Error::InvalidTaxonomy(e.to_string()))?;
        Self::from_file_data(file, normalizer)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_file_with(path, TextNormalizer::default())
    }

    pub fn from_json_file_with<P: AsRef<Path>>(
        path: P,
        normalizer: TextNormalizer,
    ) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidTaxonomy(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str_with(&data, normalizer)
    }

    pub fn from_file_data(file: TaxonomyFile, normalizer: TextNormalizer) -> Result<Self> {
        let mut builder = TaxonomyBuilder::default().normalizer(normalizer);
        for entry in file.skills {
            builder = builder.skill(entry.canonical, entry.aliases);
        }
        builder.build()
    }

    /// Exact lookup of an already compact, normalized key
    #[inline]
    pub fn lookup(&self, key: &str) -> Option<&CanonicalSkill> {
        self.synonyms.get(key)
    }

    /// Normalize `raw` and look it up exactly
    pub fn resolve(&self, raw: &str) -> Option<&CanonicalSkill> {
        self.lookup(&self.normalizer.compact_key(raw))
    }

    /// All known surface keys, in lexicographic order
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        self.synonyms.keys().map(String::as_str)
    }

    pub fn canonical_skills(&self) -> &[CanonicalSkill] {
        &self.canonical
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// The same entries keyed by `normalizer`
    pub fn with_normalizer(&self, normalizer: TextNormalizer) -> Result<Self> {
        TaxonomyBuilder {
            entries: self.entries.clone(),
            normalizer: Some(normalizer),
        }
        .build()
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn surface_count(&self) -> usize {
        self.synonyms.len()
    }
}

#[derive(Debug, Default)]
pub struct TaxonomyBuilder {
    entries: Vec<(String, Vec<String>)>,
    normalizer: Option<TextNormalizer>,
}

impl TaxonomyBuilder {
    pub fn skill<I, S>(mut self, canonical: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((canonical.into(), aliases.into_iter().map(Into::into).collect()));
        self
    }

    /// Single alias, convenient for synonym-style tables ("py" -> "python")
    pub fn synonym(self, surface: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.skill(canonical, [surface.into()])
    }

    pub fn normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn build(self) -> Result<Taxonomy> {
        let normalizer = self.normalizer.unwrap_or_default();
        let mut synonyms: BTreeMap<String, CanonicalSkill> = BTreeMap::new();
        let mut canonical: Vec<CanonicalSkill> = Vec::new();
        // lowercase spelling -> index in `canonical`
        let mut spelled: AHashMap<String, usize> = AHashMap::new();
        let mut entries: Vec<(String, Vec<String>)> = Vec::with_capacity(self.entries.len());

        for (name, aliases) in self.entries {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::InvalidTaxonomy("empty canonical skill name".to_string()));
            }

            let skill = match spelled.get(&name.to_lowercase()) {
                Some(&idx) if canonical[idx].as_str() == name => canonical[idx].clone(),
                Some(&idx) => {
                    return Err(Error::InvalidTaxonomy(format!(
                        "canonical skill '{}' conflicts with '{}' (names are case-insensitive)",
                        name, canonical[idx]
                    )));
                }
                None => {
                    let skill = CanonicalSkill::new(name.clone());
                    spelled.insert(name.to_lowercase(), canonical.len());
                    canonical.push(skill.clone());
                    skill
                }
            };

            let surfaces = std::iter::once(name.as_str()).chain(aliases.iter().map(String::as_str));
            for surface in surfaces {
                let key = normalizer.compact_key(surface);
                if key.is_empty() {
                    return Err(Error::InvalidTaxonomy(format!(
                        "surface form '{}' of '{}' is empty after normalization",
                        surface, skill
                    )));
                }
                match synonyms.get(&key) {
                    Some(existing) if existing != &skill => {
                        return Err(Error::InvalidTaxonomy(format!(
                            "surface form '{}' maps to both '{}' and '{}'",
                            key, existing, skill
                        )));
                    }
                    Some(_) => {}
                    None => {
                        synonyms.insert(key, skill.clone());
                    }
                }
            }
            entries.push((name, aliases));
        }

        if canonical.is_empty() {
            return Err(Error::EmptyTaxonomy);
        }

        Ok(Taxonomy {
            synonyms,
            canonical,
            normalizer,
            entries,
        })
    }
}
