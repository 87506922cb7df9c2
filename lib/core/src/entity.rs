use serde::{Deserialize, Serialize};
use crate::skill::SkillSet;

/// External identifier of a job, candidate or query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Integer(u64),
    String(String),
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::String(s) => write!(f, "{}", s),
            EntityId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId::String(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::String(s.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(i: u64) -> Self {
        EntityId::Integer(i)
    }
}

/// An entity as handed over by the ingestion layer: raw, uncanonicalized skill strings.
///
/// Accepts the column names of the scraped job and resume exports as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    #[serde(alias = "_id")]
    pub id: EntityId,
    #[serde(default, alias = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        alias = "Extracted Skills",
        alias = "skills[0]",
        deserialize_with = "null_as_empty"
    )]
    pub skills: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Entity {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<EntityId>, skills: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            skills,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title if present, otherwise the identifier
    pub fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// An entity whose raw skills have been run through the canonicalizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkilledEntity {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub skills: SkillSet,
}

impl SkilledEntity {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<EntityId>, title: Option<String>, skills: SkillSet) -> Self {
        Self {
            id: id.into(),
            title,
            skills,
        }
    }

    pub fn label(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.id.to_string())
    }
}
