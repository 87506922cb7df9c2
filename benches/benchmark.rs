// Benchmarks for canonicalization, index build and search
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand::rngs::StdRng;
use skillmatch::{
    CanonicalSkill, Canonicalizer, HybridRanker, IndexConfig, SimilarityIndex, SkillSet, Taxonomy,
    Vocabulary,
};
use std::sync::Arc;

const RAW_SKILLS: &[&str] = &[
    "Python", "py", "Machine-Learning", "SQL queries", "Java", "Spring Boot", "ReactJS",
    "JavaScript", "CSS3", "AWS", "Docker", "Kubernetes", "CI/CD", "Pyhton", "Tablaeu",
    "Excel", "Project Management", "Communication Skills", "Node.js", "Git",
];

fn random_sets(canonicalizer: &Canonicalizer, count: usize, seed: u64) -> Vec<SkillSet> {
    let skills: Vec<&CanonicalSkill> = canonicalizer.taxonomy().canonical_skills().iter().collect();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let n = rng.random_range(3..12);
            (0..n)
                .map(|_| skills[rng.random_range(0..skills.len())].clone())
                .collect()
        })
        .collect()
}

fn benchmark_canonicalize(c: &mut Criterion) {
    let canonicalizer = Canonicalizer::new(Arc::new(Taxonomy::builtin().unwrap()));
    let mut group = c.benchmark_group("canonicalize");

    group.bench_function("exact_and_fuzzy_mix", |b| {
        b.iter(|| canonicalizer.canonicalize_all(black_box(RAW_SKILLS)))
    });
    group.bench_function("fuzzy_only", |b| {
        b.iter(|| canonicalizer.canonicalize(black_box("Kubernets Orchestraton")))
    });

    group.finish();
}

fn benchmark_build(c: &mut Criterion) {
    let canonicalizer = Canonicalizer::new(Arc::new(Taxonomy::builtin().unwrap()));
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for size in [1000, 5000].iter() {
        let sets = random_sets(&canonicalizer, *size, 7);
        let vocabulary = Vocabulary::sorted(&sets);
        let vectors = vocabulary.encode_all(&sets).unwrap();

        for config in [IndexConfig::dense(), IndexConfig::binary()] {
            let name = config.backend.to_string();
            group.bench_with_input(BenchmarkId::new(name, size), &vectors, |b, vectors| {
                b.iter(|| SimilarityIndex::build(&config, &vocabulary, vectors).unwrap())
            });
        }
    }

    group.finish();
}

fn benchmark_search(c: &mut Criterion) {
    let canonicalizer = Canonicalizer::new(Arc::new(Taxonomy::builtin().unwrap()));
    let mut group = c.benchmark_group("search");

    let sets = random_sets(&canonicalizer, 10_000, 11);
    let vocabulary = Vocabulary::sorted(&sets);
    let vectors = vocabulary.encode_all(&sets).unwrap();
    let queries: Vec<_> = random_sets(&canonicalizer, 100, 12)
        .iter()
        .map(|q| vocabulary.encode_lossy(q).0)
        .collect();

    for config in [IndexConfig::dense(), IndexConfig::binary()] {
        let index = SimilarityIndex::build(&config, &vocabulary, &vectors).unwrap();
        let mut i = 0;
        group.bench_function(BenchmarkId::new("hnsw", config.backend.to_string()), |b| {
            b.iter(|| {
                i = (i + 1) % queries.len();
                index.search(black_box(&queries[i]), 10).unwrap()
            })
        });
    }

    let ranker = HybridRanker::new(10);
    let query = &sets[0];
    group.bench_function("hybrid_exhaustive_10k", |b| {
        b.iter(|| {
            ranker
                .rank(&vocabulary, black_box(query), sets.iter().enumerate().map(|(i, s)| (i, s)))
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_canonicalize, benchmark_build, benchmark_search);
criterion_main!(benches);
