//! Recommendation orchestrator
//!
//! Ties canonicalization, encoding and retrieval together. Two retrieval modes
//! are supported:
//!
//! - [`RetrievalMode::Index`]: search the persisted HNSW index of a category.
//!   Match scores are distances, smaller is better.
//! - [`RetrievalMode::Exhaustive`]: hybrid Jaccard/cosine score against every
//!   entity of the corpus. Match scores are similarities in [0, 1], larger is better.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skillmatch_core::{
    CanonicalSkill, Canonicalizer, CanonicalizerConfig, Entity, EntityId, Error, IndexConfig,
    Result, SkillSet, SkilledEntity, Taxonomy, Vocabulary, VocabularyOrder,
};
use skillmatch_similarity::HybridRanker;
use skillmatch_storage::{ArtifactStore, CorpusStore, IndexArtifact};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    #[default]
    Index,
    Exhaustive,
}

impl std::fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrievalMode::Index => write!(f, "index"),
            RetrievalMode::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

impl std::str::FromStr for RetrievalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "index" => Ok(RetrievalMode::Index),
            "exhaustive" => Ok(RetrievalMode::Exhaustive),
            other => Err(Error::InvalidConfig(format!("unknown retrieval mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Matches returned per query
    pub top_k: usize,
    pub mode: RetrievalMode,
    /// Exhaustive mode: add query-only skills to the vocabulary so they count toward cosine
    pub include_query_skills: bool,
    pub index: IndexConfig,
    pub canonicalizer: CanonicalizerConfig,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            mode: RetrievalMode::default(),
            include_query_skills: true,
            index: IndexConfig::default(),
            canonicalizer: CanonicalizerConfig::default(),
        }
    }
}

impl RecommenderConfig {
    /// Read a JSON config file; absent fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".to_string()));
        }
        if !(0.0..=100.0).contains(&self.canonicalizer.threshold) {
            return Err(Error::InvalidConfig(format!(
                "match threshold {} outside [0, 100]",
                self.canonicalizer.threshold
            )));
        }
        self.index.params().validate()
    }
}

/// Outcome of a query, independent of how many matches it produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Ranked,
    /// No query skill survived canonicalization, or none is known to the corpus
    NoMatchableSkills,
    /// The corpus holds no entities
    NoCandidates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: EntityId,
    pub label: String,
    /// Distance in index mode, hybrid similarity in exhaustive mode
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub mode: RetrievalMode,
    pub status: QueryStatus,
    pub query_skills: Vec<CanonicalSkill>,
    /// Query skills the corpus vocabulary does not contain
    pub out_of_vocabulary: Vec<CanonicalSkill>,
    pub matches: Vec<Match>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCategory {
    pub category: String,
    pub reason: String,
}

/// Per-category results of a multi-category query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub results: Vec<CategoryResult>,
    pub skipped: Vec<SkippedCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltCategory {
    pub category: String,
    pub rows: usize,
    pub skills: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub built: Vec<BuiltCategory>,
    pub skipped: Vec<SkippedCategory>,
}

/// Top jobs for one candidate of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecommendations {
    pub candidate: EntityId,
    pub status: QueryStatus,
    pub matches: Vec<Match>,
}

/// One skill -> entity link of the skill graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEdge {
    pub skill: CanonicalSkill,
    pub id: EntityId,
    pub distance: f32,
}

pub struct Recommender {
    canonicalizer: Canonicalizer,
    config: RecommenderConfig,
    artifacts: ArtifactStore,
    corpora: CorpusStore,
}

impl Recommender {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        config: RecommenderConfig,
        artifacts: ArtifactStore,
        corpora: CorpusStore,
    ) -> Result<Self> {
        config.validate()?;
        let canonicalizer = Canonicalizer::with_config(taxonomy, config.canonicalizer.clone())?;
        Ok(Self {
            canonicalizer,
            config,
            artifacts,
            corpora,
        })
    }

    /// Recommender over `<index_dir>` artifacts and `<data_dir>` corpora
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(
        index_dir: P,
        data_dir: Q,
        taxonomy: Arc<Taxonomy>,
        config: RecommenderConfig,
    ) -> Result<Self> {
        let artifacts = ArtifactStore::new(index_dir)?;
        let corpora = CorpusStore::new(data_dir);
        Self::new(taxonomy, config, artifacts, corpora)
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn corpora(&self) -> &CorpusStore {
        &self.corpora
    }

    /// Many raw skill strings to one deduplicated set, first-seen order
    pub fn canonicalize<S: AsRef<str>>(&self, raw_skills: &[S]) -> SkillSet {
        self.canonicalizer.canonicalize_all(raw_skills)
    }

    /// Build and persist the index of one category from its corpus
    pub fn build_index(&self, category: &str) -> Result<Arc<IndexArtifact>> {
        let entities = self.corpora.load(category)?;
        let skilled = self.canonicalizer.canonicalize_entities(&entities);
        let artifact = IndexArtifact::build(category, &skilled, &self.config.index)?;
        self.artifacts.save(artifact)
    }

    /// Build every category found in the data directory. A failing category is
    /// reported and does not stop the others.
    pub fn build_all(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        for category in self.corpora.categories()? {
            match self.build_index(&category) {
                Ok(artifact) => report.built.push(BuiltCategory {
                    category,
                    rows: artifact.len(),
                    skills: artifact.vocabulary().len(),
                }),
                Err(e) => {
                    warn!(category = %category, error = %e, "skipping category");
                    report.skipped.push(SkippedCategory {
                        category,
                        reason: e.to_string(),
                    });
                }
            }
        }
        info!(
            built = report.built.len(),
            skipped = report.skipped.len(),
            "index build finished"
        );
        Ok(report)
    }

    /// Persisted artifact of `category`, rebuilt from the corpus when missing or corrupt
    pub fn load_or_build(&self, category: &str) -> Result<Arc<IndexArtifact>> {
        match self.artifacts.load(category) {
            Ok(artifact) => Ok(artifact),
            Err(e @ (Error::IndexUnavailable(_) | Error::CorruptArtifact(_))) => {
                warn!(category, error = %e, "index not usable, rebuilding from corpus");
                self.artifacts.evict(category);
                self.build_index(category)
            }
            Err(e) => Err(e),
        }
    }

    /// Query one category with the configured mode
    pub fn recommend<S: AsRef<str>>(
        &self,
        category: &str,
        raw_skills: &[S],
    ) -> Result<Recommendations> {
        match self.config.mode {
            RetrievalMode::Index => {
                let artifact = self.load_or_build(category)?;
                self.recommend_indexed(&artifact, raw_skills)
            }
            RetrievalMode::Exhaustive => {
                let entities = self.corpora.load(category)?;
                let skilled = self.canonicalizer.canonicalize_entities(&entities);
                self.recommend_exhaustive(raw_skills, &skilled)
            }
        }
    }

    /// Nearest entities of `artifact` to the query skills
    pub fn recommend_indexed<S: AsRef<str>>(
        &self,
        artifact: &IndexArtifact,
        raw_skills: &[S],
    ) -> Result<Recommendations> {
        let query = self.canonicalize(raw_skills);
        let query_skills: Vec<CanonicalSkill> = query.iter().cloned().collect();
        let (vector, out_of_vocabulary) = artifact.vocabulary().encode_lossy(&query);
        if !out_of_vocabulary.is_empty() {
            debug!(
                category = artifact.category(),
                skills = ?out_of_vocabulary,
                "query skills outside corpus vocabulary"
            );
        }

        let mut recommendations = Recommendations {
            mode: RetrievalMode::Index,
            status: QueryStatus::Ranked,
            query_skills,
            out_of_vocabulary,
            matches: Vec::new(),
        };
        if artifact.is_empty() {
            recommendations.status = QueryStatus::NoCandidates;
            return Ok(recommendations);
        }
        if vector.is_zero() {
            recommendations.status = QueryStatus::NoMatchableSkills;
            return Ok(recommendations);
        }

        // entities without any vocabulary skill are not indexed for search
        recommendations.matches = artifact
            .index()
            .search(&vector, self.config.top_k)?
            .into_iter()
            .filter_map(|hit| {
                artifact.entity(hit.row).map(|e| Match {
                    id: e.id.clone(),
                    label: e.label(),
                    score: hit.distance,
                })
            })
            .collect();
        Ok(recommendations)
    }

    /// Hybrid-score every candidate against the query skills
    pub fn recommend_exhaustive<S: AsRef<str>>(
        &self,
        raw_skills: &[S],
        candidates: &[SkilledEntity],
    ) -> Result<Recommendations> {
        let query = self.canonicalize(raw_skills);
        let mut recommendations = Recommendations {
            mode: RetrievalMode::Exhaustive,
            status: QueryStatus::Ranked,
            query_skills: query.iter().cloned().collect(),
            out_of_vocabulary: Vec::new(),
            matches: Vec::new(),
        };
        if candidates.is_empty() {
            recommendations.status = QueryStatus::NoCandidates;
            return Ok(recommendations);
        }
        if query.is_empty() {
            recommendations.status = QueryStatus::NoMatchableSkills;
            return Ok(recommendations);
        }

        let candidate_sets = candidates.iter().map(|c| &c.skills);
        let vocabulary = if self.config.include_query_skills {
            Vocabulary::build(
                std::iter::once(&query).chain(candidate_sets),
                VocabularyOrder::Insertion,
            )
        } else {
            Vocabulary::build(candidate_sets, VocabularyOrder::Insertion)
        };
        recommendations.out_of_vocabulary = query
            .iter()
            .filter(|s| !vocabulary.contains(s))
            .cloned()
            .collect();
        if recommendations.out_of_vocabulary.len() == query.len() {
            recommendations.status = QueryStatus::NoMatchableSkills;
            return Ok(recommendations);
        }

        recommendations.matches = self.rank_against(&vocabulary, &query, candidates)?;
        Ok(recommendations)
    }

    fn rank_against(
        &self,
        vocabulary: &Vocabulary,
        query: &SkillSet,
        candidates: &[SkilledEntity],
    ) -> Result<Vec<Match>> {
        let ranked = HybridRanker::new(self.config.top_k).rank(
            vocabulary,
            query,
            candidates.iter().map(|c| (c, &c.skills)),
        )?;
        Ok(ranked
            .into_iter()
            .map(|r| Match {
                id: r.item.id.clone(),
                label: r.item.label(),
                score: r.score.score,
            })
            .collect())
    }

    /// Query several categories. Categories that fail (missing corpus, unreadable
    /// artifact) are listed in `skipped` and the rest still answer.
    pub fn recommend_categories<C, S>(&self, categories: &[C], raw_skills: &[S]) -> CategoryReport
    where
        C: AsRef<str>,
        S: AsRef<str>,
    {
        let mut report = CategoryReport::default();
        for category in categories {
            let category = category.as_ref();
            match self.recommend(category, raw_skills) {
                Ok(recommendations) => report.results.push(CategoryResult {
                    category: category.to_string(),
                    recommendations,
                }),
                Err(e) => {
                    warn!(category, error = %e, "skipping category");
                    report.skipped.push(SkippedCategory {
                        category: category.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Top jobs for every candidate, scored exhaustively.
    ///
    /// One vocabulary spans candidates and jobs, so scores are comparable
    /// across the whole batch. Output follows candidate order.
    pub fn recommend_for_candidates(
        &self,
        candidates: &[Entity],
        jobs: &[Entity],
    ) -> Result<Vec<CandidateRecommendations>> {
        let candidates = self.canonicalizer.canonicalize_entities(candidates);
        let jobs = self.canonicalizer.canonicalize_entities(jobs);
        let vocabulary = Vocabulary::build(
            candidates.iter().chain(jobs.iter()).map(|e| &e.skills),
            VocabularyOrder::Insertion,
        );
        info!(
            candidates = candidates.len(),
            jobs = jobs.len(),
            skills = vocabulary.len(),
            "scoring candidate batch"
        );

        candidates
            .par_iter()
            .map(|candidate| -> Result<CandidateRecommendations> {
                let (status, matches) = if jobs.is_empty() {
                    (QueryStatus::NoCandidates, Vec::new())
                } else if candidate.skills.is_empty() {
                    (QueryStatus::NoMatchableSkills, Vec::new())
                } else {
                    (
                        QueryStatus::Ranked,
                        self.rank_against(&vocabulary, &candidate.skills, &jobs)?,
                    )
                };
                Ok(CandidateRecommendations {
                    candidate: candidate.id.clone(),
                    status,
                    matches,
                })
            })
            .collect()
    }

    /// For every skill of the category vocabulary, its `per_skill` nearest entities
    pub fn skill_job_edges(&self, category: &str, per_skill: usize) -> Result<Vec<SkillEdge>> {
        let artifact = self.load_or_build(category)?;
        let vocabulary = artifact.vocabulary();
        let per_skill_edges: Vec<Vec<SkillEdge>> = vocabulary
            .skills()
            .par_iter()
            .map(|skill| -> Result<Vec<SkillEdge>> {
                let single: SkillSet = std::iter::once(skill.clone()).collect();
                let vector = vocabulary.encode(&single)?;
                let hits = artifact.index().search(&vector, per_skill)?;
                Ok(hits
                    .into_iter()
                    .filter_map(|hit| {
                        artifact.entity(hit.row).map(|e| SkillEdge {
                            skill: skill.clone(),
                            id: e.id.clone(),
                            distance: hit.distance,
                        })
                    })
                    .collect())
            })
            .collect::<Result<_>>()?;
        Ok(per_skill_edges.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn taxonomy() -> Arc<Taxonomy> {
        Arc::new(
            Taxonomy::builder()
                .synonym("py", "python")
                .synonym("ml", "machine learning")
                .skill("sql", Vec::<String>::new())
                .skill("java", Vec::<String>::new())
                .skill("excel", Vec::<String>::new())
                .skill("rust", Vec::<String>::new())
                .build()
                .unwrap(),
        )
    }

    fn recommender(config: RecommenderConfig) -> (TempDir, Recommender) {
        let dir = TempDir::new().unwrap();
        let rec = Recommender::open(
            dir.path().join("index"),
            dir.path().join("data"),
            taxonomy(),
            config,
        )
        .unwrap();
        rec.corpora()
            .save(
                "Data",
                &[
                    Entity::new(1u64, vec!["Python".into(), "SQL".into()])
                        .with_title("Data Engineer"),
                    Entity::new(2u64, vec!["Java".into()]).with_title("Backend"),
                    Entity::new(3u64, vec!["ML".into(), "py".into()]).with_title("ML Engineer"),
                    Entity::new(4u64, vec!["Excel".into(), "sql".into()]).with_title("Analyst"),
                ],
            )
            .unwrap();
        (dir, rec)
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Exhaustive".parse::<RetrievalMode>().unwrap(), RetrievalMode::Exhaustive);
        assert!("graph".parse::<RetrievalMode>().is_err());
    }

    #[test]
    fn test_config_from_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"top_k": 3, "mode": "exhaustive", "index": {"backend": "binary"}}"#,
        )
        .unwrap();
        let config = RecommenderConfig::from_file(&path).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.mode, RetrievalMode::Exhaustive);
        assert!(config.include_query_skills);
        assert_eq!(config.index.params().ef_construction, 40);
        assert_eq!(config.canonicalizer.threshold, 80.0);
    }

    #[test]
    fn test_config_rejects_zero_top_k() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"top_k": 0}"#).unwrap();
        assert!(matches!(RecommenderConfig::from_file(&path), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            RecommenderConfig::from_file(dir.path().join("missing.json")),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_index_mode_builds_on_first_use() {
        let (_dir, rec) = recommender(RecommenderConfig::default());
        assert!(!rec.artifacts().exists("Data"));

        let result = rec.recommend("Data", &["python", "machine learning"]).unwrap();
        assert_eq!(result.status, QueryStatus::Ranked);
        assert_eq!(result.matches[0].label, "ML Engineer");
        assert!(result.matches[0].score.abs() < 1e-6);
        assert!(rec.artifacts().exists("Data"));
    }

    #[test]
    fn test_index_mode_reports_out_of_vocabulary() {
        let (_dir, rec) = recommender(RecommenderConfig::default());
        let result = rec.recommend("Data", &["Rust", "SQL"]).unwrap();
        assert_eq!(result.out_of_vocabulary, vec![CanonicalSkill::from("rust")]);
        assert_eq!(result.status, QueryStatus::Ranked);

        let result = rec.recommend("Data", &["rust"]).unwrap();
        assert_eq!(result.status, QueryStatus::NoMatchableSkills);
        assert!(result.is_empty());
    }

    #[test]
    fn test_exhaustive_mode_scores_in_unit_range() {
        let config = RecommenderConfig {
            mode: RetrievalMode::Exhaustive,
            top_k: 10,
            ..Default::default()
        };
        let (_dir, rec) = recommender(config);
        let result = rec.recommend("Data", &["Python", "ML"]).unwrap();
        assert_eq!(result.matches.len(), 4);
        assert_eq!(result.matches[0].label, "ML Engineer");
        assert!((result.matches[0].score - 1.0).abs() < 1e-6);
        assert!(result.matches.iter().all(|m| (0.0..=1.0).contains(&m.score)));
    }

    #[test]
    fn test_exhaustive_without_query_skills_in_vocabulary() {
        let config = RecommenderConfig {
            mode: RetrievalMode::Exhaustive,
            include_query_skills: false,
            ..Default::default()
        };
        let (_dir, rec) = recommender(config);
        let result = rec.recommend("Data", &["rust"]).unwrap();
        assert_eq!(result.status, QueryStatus::NoMatchableSkills);
        assert_eq!(result.out_of_vocabulary, vec![CanonicalSkill::from("rust")]);
    }

    #[test]
    fn test_status_order_is_the_same_in_every_mode() {
        let dir = TempDir::new().unwrap();
        for mode in [RetrievalMode::Index, RetrievalMode::Exhaustive] {
            let config = RecommenderConfig {
                mode,
                ..Default::default()
            };
            let rec = Recommender::open(
                dir.path().join("index"),
                dir.path().join("data"),
                taxonomy(),
                config,
            )
            .unwrap();
            rec.corpora().save("Empty", &[]).unwrap();
            // empty corpus wins over an unmatchable query
            let result = rec.recommend("Empty", &["zzzz"]).unwrap();
            assert_eq!(result.status, QueryStatus::NoCandidates, "{} mode", mode);
        }

        let (_dir, rec) = recommender(RecommenderConfig::default());
        let batch = rec
            .recommend_for_candidates(&[Entity::new(1u64, Vec::new())], &[])
            .unwrap();
        assert_eq!(batch[0].status, QueryStatus::NoCandidates);
    }

    #[test]
    fn test_index_mode_skips_entities_without_skills() {
        let (_dir, rec) = recommender(RecommenderConfig {
            top_k: 10,
            ..Default::default()
        });
        let mut entities = rec.corpora().load("Data").unwrap();
        entities.push(Entity::new(5u64, vec!["Nursing".into()]).with_title("Nurse"));
        rec.corpora().save("Data", &entities).unwrap();

        let result = rec.recommend("Data", &["sql"]).unwrap();
        assert_eq!(result.matches.len(), 4);
        assert!(result.matches.iter().all(|m| m.label != "Nurse"));
    }

    #[test]
    fn test_open_applies_extra_stop_words() {
        let dir = TempDir::new().unwrap();
        let config = RecommenderConfig {
            mode: RetrievalMode::Exhaustive,
            canonicalizer: CanonicalizerConfig {
                extra_stop_words: vec!["rusty".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let rec = Recommender::open(
            dir.path().join("index"),
            dir.path().join("data"),
            taxonomy(),
            config,
        )
        .unwrap();
        assert!(rec.canonicalize(&["rusty"]).is_empty());
        assert_eq!(rec.canonicalize(&["rusty", "java"]).len(), 1);

        let (_dir, plain) = recommender(RecommenderConfig::default());
        assert!(plain.canonicalize(&["rusty"]).contains(&CanonicalSkill::from("rust")));
    }

    #[test]
    fn test_skill_job_edges() {
        let (_dir, rec) = recommender(RecommenderConfig::default());
        let edges = rec.skill_job_edges("Data", 1).unwrap();
        // one edge per vocabulary skill
        assert_eq!(edges.len(), 5);
        let java = edges.iter().find(|e| e.skill.as_str() == "java").unwrap();
        assert_eq!(java.id, EntityId::Integer(2));
    }
}
