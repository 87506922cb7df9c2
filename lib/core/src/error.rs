use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    #[error("Taxonomy is empty")]
    EmptyTaxonomy,

    #[error("Skill '{skill}' is not part of vocabulary {fingerprint}")]
    VocabularyMismatch { skill: String, fingerprint: String },

    #[error("Vector space mismatch: expected vocabulary {expected}, got {actual}")]
    FingerprintMismatch { expected: String, actual: String },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Corrupt index artifact: {0}")]
    CorruptArtifact(String),

    #[error("Corpus unavailable: {0}")]
    CorpusUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
