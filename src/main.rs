use anyhow::Context;
use clap::{Parser, Subcommand};
use skillmatch::{
    Backend, Entity, QueryStatus, Recommender, RecommenderConfig, RetrievalMode, Taxonomy,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Skill-based job recommendations
#[derive(Parser, Debug)]
#[command(name = "skillmatch")]
#[command(about = "Match resumes and jobs by skills", long_about = None)]
struct Args {
    /// Directory holding <category>_subset.json corpora
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Directory for persisted index artifacts
    #[arg(short, long, default_value = "./indexes")]
    index_dir: PathBuf,

    /// Taxonomy JSON file; the built-in taxonomy is used when absent
    #[arg(short, long)]
    taxonomy: Option<PathBuf>,

    /// Recommender config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical skills of raw skill strings
    Canonicalize {
        /// Raw skill strings
        #[arg(required = true)]
        skills: Vec<String>,
    },
    /// Build and persist indexes from the data directory
    Build {
        /// Categories to build; all corpora in the data directory when empty
        #[arg(short, long)]
        category: Vec<String>,

        /// Vector backend
        #[arg(long)]
        backend: Option<Backend>,
    },
    /// Recommend entities for a set of skills
    Recommend {
        /// Categories to search
        #[arg(short, long, required = true)]
        category: Vec<String>,

        /// Query skills
        #[arg(short, long, required = true)]
        skill: Vec<String>,

        /// Number of matches per category
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// index | exhaustive
        #[arg(long)]
        mode: Option<RetrievalMode>,
    },
    /// Top jobs for every candidate in a candidates file
    Match {
        /// JSON array of candidates
        #[arg(long)]
        candidates: PathBuf,

        /// JSON array of jobs
        #[arg(long)]
        jobs: PathBuf,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Skill -> job edges of one category, as JSON
    Edges {
        #[arg(short, long)]
        category: String,

        /// Jobs linked to each skill
        #[arg(long, default_value_t = 5)]
        per_skill: usize,
    },
}

fn load_entities(path: &Path) -> anyhow::Result<Vec<Entity>> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => RecommenderConfig::from_file(path)?,
        None => RecommenderConfig::default(),
    };

    let normalizer = config.canonicalizer.normalizer();
    let taxonomy = match &args.taxonomy {
        Some(path) => Taxonomy::from_json_file_with(path, normalizer)?,
        None => Taxonomy::builtin_with(normalizer)?,
    };
    info!(
        skills = taxonomy.len(),
        surface_forms = taxonomy.surface_count(),
        "taxonomy loaded"
    );
    let taxonomy = Arc::new(taxonomy);

    match args.command {
        Command::Canonicalize { skills } => {
            let recommender = Recommender::open(&args.index_dir, &args.data_dir, taxonomy, config)?;
            for raw in &skills {
                let canonical = recommender.canonicalizer().canonicalize(raw);
                let names: Vec<&str> = canonical.iter().map(|s| s.as_str()).collect();
                println!("{} -> [{}]", raw, names.join(", "));
            }
        }
        Command::Build { category, backend } => {
            if let Some(backend) = backend {
                config.index.backend = backend;
            }
            let recommender = Recommender::open(&args.index_dir, &args.data_dir, taxonomy, config)?;
            if category.is_empty() {
                let report = recommender.build_all()?;
                for built in &report.built {
                    println!(
                        "built {} ({} rows, {} skills)",
                        built.category, built.rows, built.skills
                    );
                }
                for skipped in &report.skipped {
                    println!("skipped {}: {}", skipped.category, skipped.reason);
                }
            } else {
                for name in &category {
                    let artifact = recommender.build_index(name)?;
                    println!("built {} ({} rows)", name, artifact.len());
                }
            }
        }
        Command::Recommend { category, skill, top_k, mode } => {
            if let Some(top_k) = top_k {
                config.top_k = top_k;
            }
            if let Some(mode) = mode {
                config.mode = mode;
            }
            let recommender = Recommender::open(&args.index_dir, &args.data_dir, taxonomy, config)?;
            let report = recommender.recommend_categories(&category, &skill);
            for result in &report.results {
                let recs = &result.recommendations;
                println!("== {} ({})", result.category, recs.mode);
                if !recs.out_of_vocabulary.is_empty() {
                    let names: Vec<&str> =
                        recs.out_of_vocabulary.iter().map(|s| s.as_str()).collect();
                    println!("   not in corpus: {}", names.join(", "));
                }
                match recs.status {
                    QueryStatus::Ranked => {
                        for (rank, m) in recs.matches.iter().enumerate() {
                            println!("{:>3}. {} [{}] {:.4}", rank + 1, m.label, m.id, m.score);
                        }
                    }
                    QueryStatus::NoMatchableSkills => println!("   no matchable skills"),
                    QueryStatus::NoCandidates => println!("   no candidates"),
                }
            }
            for skipped in &report.skipped {
                println!("== {} skipped: {}", skipped.category, skipped.reason);
            }
        }
        Command::Match { candidates, jobs, top_k } => {
            if let Some(top_k) = top_k {
                config.top_k = top_k;
            }
            let candidates = load_entities(&candidates)?;
            let jobs = load_entities(&jobs)?;
            let recommender = Recommender::open(&args.index_dir, &args.data_dir, taxonomy, config)?;
            let results = recommender.recommend_for_candidates(&candidates, &jobs)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Edges { category, per_skill } => {
            let recommender = Recommender::open(&args.index_dir, &args.data_dir, taxonomy, config)?;
            let edges = recommender.skill_job_edges(&category, per_skill)?;
            println!("{}", serde_json::to_string_pretty(&edges)?);
        }
    }

    Ok(())
}
