//! Category corpora: `<data-dir>/<category>_subset.json`, a JSON array of entities

use crate::{safe_category_name, write_atomic};
use skillmatch_core::{Entity, Error, Result};
use std::path::{Path, PathBuf};

const CORPUS_SUFFIX: &str = "_subset.json";

#[derive(Debug, Clone)]
pub struct CorpusStore {
    data_dir: PathBuf,
}

impl CorpusStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, category: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}{}", safe_category_name(category), CORPUS_SUFFIX))
    }

    /// Entities of `category` in file order
    pub fn load(&self, category: &str) -> Result<Vec<Entity>> {
        let path = self.path(category);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CorpusUnavailable(format!(
                    "category '{}': no corpus at {}",
                    category,
                    path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&data)
            .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, category: &str, entities: &[Entity]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.data_dir)?;
        let path = self.path(category);
        write_atomic(&path, &serde_json::to_vec_pretty(entities)?)?;
        Ok(path)
    }

    /// Categories with a corpus file, sorted. Names are the sanitised file stems.
    pub fn categories(&self) -> Result<Vec<String>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }
        let mut categories = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if let Some(stem) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(CORPUS_SUFFIX))
            {
                categories.push(stem.to_string());
            }
        }
        categories.sort();
        Ok(categories)
    }
}
