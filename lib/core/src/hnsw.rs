use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Element type and distance function of an HNSW graph
pub trait Space: Debug + Clone + Send + Sync + 'static {
    type Elem: Copy + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Dissimilarity; smaller is closer
    fn distance(a: &[Self::Elem], b: &[Self::Elem]) -> f32;
}

/// Unit-length f32 vectors compared by squared L2
#[derive(Debug, Clone, Copy)]
pub struct DenseSpace;

impl Space for DenseSpace {
    type Elem = f32;

    #[inline(always)]
    fn distance(a: &[f32], b: &[f32]) -> f32 {
        crate::metric::l2_squared(a, b)
    }
}

/// Packed bit strings compared by Hamming distance
#[derive(Debug, Clone, Copy)]
pub struct BinarySpace;

impl Space for BinarySpace {
    type Elem = u8;

    #[inline(always)]
    fn distance(a: &[u8], b: &[u8]) -> f32 {
        crate::metric::hamming(a, b) as f32
    }
}

/// Graph construction and search parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnswParams {
    /// M: links per node on upper layers; layer 0 allows 2*M
    pub max_connections: usize,
    pub max_layers: usize,
    pub ef_construction: usize,
    pub ef_search: usize,
    /// Seeds level assignment so that identical inputs build identical graphs
    pub seed: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            max_connections: 32,
            max_layers: 16,
            ef_construction: 200,
            ef_search: 32,
            seed: 0x5EED,
        }
    }
}

impl HnswParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_connections < 2 {
            return Err(Error::InvalidConfig("max_connections must be at least 2".to_string()));
        }
        if self.max_layers == 0 {
            return Err(Error::InvalidConfig("max_layers must be at least 1".to_string()));
        }
        if self.ef_construction == 0 || self.ef_search == 0 {
            return Err(Error::InvalidConfig(
                "ef_construction and ef_search must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fast bit vector for visited node tracking
#[derive(Clone)]
struct VisitedSet {
    bits: Vec<u64>,
    generation: u64,
    generations: Vec<u64>,
}

impl VisitedSet {
    #[inline]
    fn new(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(64).max(1);
        Self {
            bits: vec![0; num_words],
            generation: 1,
            generations: vec![0; num_words],
        }
    }

    /// Forget all entries without touching memory
    #[inline]
    fn clear(&mut self) {
        self.generation += 1;
        if self.generation == 0 {
            self.generation = 1;
            self.bits.fill(0);
            self.generations.fill(0);
        }
    }

    #[inline]
    fn ensure_capacity(&mut self, capacity: usize) {
        let num_words = capacity.div_ceil(64);
        if num_words > self.bits.len() {
            self.bits.resize(num_words, 0);
            self.generations.resize(num_words, 0);
        }
    }

    /// Returns `true` if `idx` was not visited yet
    #[inline]
    fn insert(&mut self, idx: usize) -> bool {
        let word_idx = idx / 64;
        let mask = 1u64 << (idx % 64);

        if word_idx >= self.bits.len() {
            self.ensure_capacity(idx + 1);
        }

        if self.generations[word_idx] != self.generation {
            self.bits[word_idx] = 0;
            self.generations[word_idx] = self.generation;
        }

        let was_set = (self.bits[word_idx] & mask) != 0;
        self.bits[word_idx] |= mask;
        !was_set
    }

    #[cfg(test)]
    fn contains(&self, idx: usize) -> bool {
        let word_idx = idx / 64;
        if word_idx >= self.bits.len() || self.generations[word_idx] != self.generation {
            return false;
        }
        (self.bits[word_idx] & (1u64 << (idx % 64))) != 0
    }
}

/// Closest-first heap entry. Ties on distance resolve to the lower row id.
#[derive(Clone, Copy)]
struct Candidate {
    idx: usize,
    dist: f32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist && self.idx == other.idx
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Furthest-first heap entry, used to hold the current best `ef` results
#[derive(Clone, Copy)]
struct ReverseCandidate {
    idx: usize,
    dist: f32,
}

impl PartialEq for ReverseCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist && self.idx == other.idx
    }
}

impl Eq for ReverseCandidate {}

impl Ord for ReverseCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .partial_cmp(&other.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for ReverseCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn by_distance_then_row(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.partial_cmp(&b.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(&b.0))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HnswNode {
    /// Neighbour lists, one per layer the node lives on. Empty for rows that
    /// are not linked into the graph.
    layers: Vec<Vec<usize>>,
    /// Later rows holding exactly this node's vector. They are reached through
    /// this node and never linked themselves.
    #[serde(default)]
    duplicates: Vec<usize>,
    /// Stored but excluded from search
    #[serde(default)]
    detached: bool,
}

impl HnswNode {
    fn linked(level: usize) -> Self {
        Self {
            layers: vec![Vec::new(); level + 1],
            ..Self::default()
        }
    }
}

/// Hierarchical navigable small-world graph.
///
/// Rows are numbered in insertion order starting at 0. Vectors live in one
/// contiguous buffer (`dim` elements per row). Searching takes `&self`, so a
/// built index can be shared between readers; inserts need exclusive access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S::Elem: Serialize",
    deserialize = "S::Elem: DeserializeOwned"
))]
pub struct HnswIndex<S: Space> {
    params: HnswParams,
    dim: usize,
    vectors: Vec<S::Elem>,
    nodes: Vec<HnswNode>,
    entry_point: Option<usize>,
    max_level: usize,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S: Space> HnswIndex<S> {
    pub fn new(dim: usize, params: HnswParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            dim,
            vectors: Vec::new(),
            nodes: Vec::new(),
            entry_point: None,
            max_level: 0,
            space: PhantomData,
        })
    }

    #[inline]
    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stored vector of a row
    #[inline]
    pub fn vector(&self, row: usize) -> &[S::Elem] {
        let start = row * self.dim;
        &self.vectors[start..start + self.dim]
    }

    #[inline]
    fn distance_to(&self, query: &[S::Elem], row: usize) -> f32 {
        S::distance(query, self.vector(row))
    }

    #[inline]
    fn max_connections(&self, layer: usize) -> usize {
        if layer == 0 {
            self.params.max_connections * 2
        } else {
            self.params.max_connections
        }
    }

    /// Exponentially decaying level, derived from the seed and the row id only
    fn select_level(&self, row: usize) -> usize {
        let mut rng = StdRng::seed_from_u64(
            self.params.seed ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        );
        let u: f64 = rng.random();
        let ml = 1.0 / (self.params.max_connections as f64).ln();
        let level = (-(1.0 - u).ln() * ml).floor() as usize;
        level.min(self.params.max_layers - 1)
    }

    /// Best-first search restricted to one layer.
    /// Returns up to `ef` rows sorted by ascending distance.
    fn search_layer(
        &self,
        query: &[S::Elem],
        entry_points: &[usize],
        ef: usize,
        layer: usize,
        visited: &mut VisitedSet,
    ) -> Vec<(usize, f32)> {
        visited.clear();
        visited.ensure_capacity(self.nodes.len());

        let mut candidates: BinaryHeap<Candidate> = BinaryHeap::with_capacity(ef * 2);
        let mut results: BinaryHeap<ReverseCandidate> = BinaryHeap::with_capacity(ef + 1);

        for &ep in entry_points {
            if visited.insert(ep) {
                let dist = self.distance_to(query, ep);
                candidates.push(Candidate { idx: ep, dist });
                results.push(ReverseCandidate { idx: ep, dist });
                if results.len() > ef {
                    results.pop();
                }
            }
        }

        while let Some(Candidate { idx: current, dist: current_dist }) = candidates.pop() {
            let worst = results.peek().map_or(f32::INFINITY, |r| r.dist);
            if results.len() >= ef && current_dist > worst {
                break;
            }

            let Some(neighbors) = self.nodes[current].layers.get(layer) else {
                continue;
            };

            for &neighbor in neighbors {
                if !visited.insert(neighbor) {
                    continue;
                }
                let dist = self.distance_to(query, neighbor);
                let worst = results.peek().map_or(f32::INFINITY, |r| r.dist);
                if results.len() < ef || dist < worst {
                    candidates.push(Candidate { idx: neighbor, dist });
                    results.push(ReverseCandidate { idx: neighbor, dist });
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut found: Vec<(usize, f32)> = results.into_iter().map(|c| (c.idx, c.dist)).collect();
        found.sort_unstable_by(by_distance_then_row);
        found
    }

    /// Walk down from the top layer to `stop_layer + 1`, one closest node per layer
    fn descend(
        &self,
        query: &[S::Elem],
        mut entry: usize,
        stop_layer: usize,
        visited: &mut VisitedSet,
    ) -> usize {
        let mut layer = self.max_level;
        while layer > stop_layer {
            let found = self.search_layer(query, &[entry], 1, layer, visited);
            if let Some(&(closest, _)) = found.first() {
                entry = closest;
            }
            layer -= 1;
        }
        entry
    }

    /// Append a vector and link it into the graph. Returns its row id.
    ///
    /// A vector equal to one already in the graph is recorded as a duplicate
    /// of that node instead of getting links of its own.
    pub fn insert(&mut self, vector: &[S::Elem]) -> Result<usize> {
        self.check_dim(vector)?;

        let row = self.nodes.len();
        let level = self.select_level(row);
        let Some(entry) = self.entry_point else {
            self.vectors.extend_from_slice(vector);
            self.nodes.push(HnswNode::linked(level));
            self.entry_point = Some(row);
            self.max_level = level;
            return Ok(row);
        };

        let mut visited = VisitedSet::new(row + 1);
        let entry = self.descend(vector, entry, level, &mut visited);

        // candidates per layer, top-down; the new row is not reachable yet
        let mut per_layer: Vec<(usize, Vec<(usize, f32)>)> = Vec::with_capacity(level + 1);
        let mut entry_points = vec![entry];
        for layer in (0..=level.min(self.max_level)).rev() {
            let found = self.search_layer(
                vector,
                &entry_points,
                self.params.ef_construction,
                layer,
                &mut visited,
            );
            entry_points = found.iter().map(|(idx, _)| *idx).collect();
            per_layer.push((layer, found));
        }

        let closest = per_layer
            .last()
            .and_then(|(_, found)| found.first())
            .map(|(idx, _)| *idx);
        self.vectors.extend_from_slice(vector);
        if let Some(closest) = closest {
            if self.vector(closest) == vector {
                self.nodes.push(HnswNode::default());
                self.nodes[closest].duplicates.push(row);
                return Ok(row);
            }
        }

        self.nodes.push(HnswNode::linked(level));
        for (layer, found) in per_layer {
            let neighbors = self.select_neighbors(&found, self.max_connections(layer));
            for &neighbor in &neighbors {
                self.link(neighbor, row, layer);
            }
            self.nodes[row].layers[layer] = neighbors;
        }

        if level > self.max_level {
            self.max_level = level;
            self.entry_point = Some(row);
        }

        Ok(row)
    }

    /// Append a vector that search never returns. Returns its row id.
    pub fn insert_detached(&mut self, vector: &[S::Elem]) -> Result<usize> {
        self.check_dim(vector)?;
        let row = self.nodes.len();
        self.vectors.extend_from_slice(vector);
        self.nodes.push(HnswNode {
            detached: true,
            ..HnswNode::default()
        });
        Ok(row)
    }

    fn check_dim(&self, vector: &[S::Elem]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Neighbour selection heuristic (Malkov & Yashunin, algorithm 4).
    ///
    /// `candidates` are sorted by ascending distance to the base node. A
    /// candidate is dropped when an already selected neighbour is strictly
    /// closer to it than the base node is.
    fn select_neighbors(&self, candidates: &[(usize, f32)], limit: usize) -> Vec<usize> {
        let mut selected: Vec<usize> = Vec::with_capacity(limit);
        for &(candidate, dist) in candidates {
            if selected.len() >= limit {
                break;
            }
            let diverse = selected
                .iter()
                .all(|&kept| S::distance(self.vector(candidate), self.vector(kept)) >= dist);
            if diverse {
                selected.push(candidate);
            }
        }
        selected
    }

    /// Add `to` to the neighbour list of `from`, re-selecting links when full
    fn link(&mut self, from: usize, to: usize, layer: usize) {
        let limit = self.max_connections(layer);
        self.nodes[from].layers[layer].push(to);
        if self.nodes[from].layers[layer].len() <= limit {
            return;
        }

        let base = self.vector(from);
        let mut scored: Vec<(usize, f32)> = self.nodes[from].layers[layer]
            .iter()
            .map(|&n| (n, S::distance(base, self.vector(n))))
            .collect();
        scored.sort_unstable_by(by_distance_then_row);
        self.nodes[from].layers[layer] = self.select_neighbors(&scored, limit);
    }

    /// Up to `k` nearest rows, ascending by distance. `ef` defaults to the
    /// configured `ef_search` and is never lower than `k`.
    pub fn search(
        &self,
        query: &[S::Elem],
        k: usize,
        ef: Option<usize>,
    ) -> Result<Vec<(usize, f32)>> {
        self.check_dim(query)?;

        let Some(entry) = self.entry_point else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let ef = ef.unwrap_or(self.params.ef_search).max(k);
        let mut visited = VisitedSet::new(self.nodes.len());
        let entry = self.descend(query, entry, 0, &mut visited);
        let found = self.search_layer(query, &[entry], ef, 0, &mut visited);

        let mut results: Vec<(usize, f32)> = Vec::with_capacity(found.len());
        for (idx, dist) in found {
            results.push((idx, dist));
            results.extend(self.nodes[idx].duplicates.iter().map(|&dup| (dup, dist)));
        }
        results.sort_unstable_by(by_distance_then_row);
        results.truncate(k);
        Ok(results)
    }

    /// Exact scan over all searchable rows; reference for recall checks
    pub fn brute_force(&self, query: &[S::Elem], k: usize) -> Vec<(usize, f32)> {
        let mut all: Vec<(usize, f32)> = (0..self.len())
            .filter(|&row| !self.nodes[row].detached)
            .map(|row| (row, self.distance_to(query, row)))
            .collect();
        all.sort_unstable_by(by_distance_then_row);
        all.truncate(k);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn random_unit_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let v: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
                let norm = crate::metric::norm(&v);
                v.into_iter().map(|x| x / norm).collect()
            })
            .collect()
    }

    #[test]
    fn test_hnsw_insert_search() {
        let mut index: HnswIndex<DenseSpace> = HnswIndex::new(3, HnswParams::default()).unwrap();
        for i in 0..10 {
            let v = [i as f32, 1.0, 0.0];
            index.insert(&v).unwrap();
        }
        let results = index.search(&[5.0, 1.0, 0.0], 3, None).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, 5);
        assert_eq!(results[0].1, 0.0);
        assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_search_respects_k_and_count() {
        let mut index: HnswIndex<DenseSpace> = HnswIndex::new(2, HnswParams::default()).unwrap();
        assert!(index.search(&[1.0, 0.0], 5, None).unwrap().is_empty());
        index.insert(&[1.0, 0.0]).unwrap();
        index.insert(&[0.0, 1.0]).unwrap();
        assert_eq!(index.search(&[1.0, 0.0], 5, None).unwrap().len(), 2);
        assert!(index.search(&[1.0, 0.0], 0, None).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index: HnswIndex<DenseSpace> = HnswIndex::new(3, HnswParams::default()).unwrap();
        assert!(matches!(
            index.insert(&[1.0, 0.0]),
            Err(Error::InvalidDimension { expected: 3, actual: 2 })
        ));
        index.insert(&[1.0, 0.0, 0.0]).unwrap();
        assert!(index.search(&[1.0], 1, None).is_err());
    }

    #[test]
    fn test_recall_against_brute_force() {
        let params = HnswParams { max_connections: 8, ..HnswParams::default() };
        let mut index: HnswIndex<DenseSpace> = HnswIndex::new(16, params).unwrap();
        for v in random_unit_vectors(500, 16, 7) {
            index.insert(&v).unwrap();
        }

        let queries = random_unit_vectors(20, 16, 99);
        let mut hits = 0;
        for q in &queries {
            let found = index.search(q, 10, Some(64)).unwrap();
            let approx: Vec<usize> = found.iter().map(|r| r.0).collect();
            let exact = index.brute_force(q, 10);
            hits += exact.iter().filter(|(row, _)| approx.contains(row)).count();
        }
        let recall = hits as f32 / (queries.len() * 10) as f32;
        assert!(recall > 0.9, "recall too low: {}", recall);
    }

    /// Many empty and identical rows ahead of distinct ones, as in corpora
    /// where postings share a single skill or have none at all
    fn crowded_rows(dim: usize) -> Vec<Vec<f32>> {
        let mut rows = vec![vec![0.0f32; dim]; 300];
        let mut sql = vec![0.0f32; dim];
        sql[0] = 1.0;
        rows.extend(vec![sql; 300]);
        for i in 0..20 {
            let mut v = vec![0.0f32; dim];
            v[1] = std::f32::consts::FRAC_1_SQRT_2;
            v[2 + i] = std::f32::consts::FRAC_1_SQRT_2;
            rows.push(v);
        }
        rows
    }

    #[test]
    fn test_duplicate_rows_do_not_hide_distinct_ones() {
        let rows = crowded_rows(22);
        let mut index: HnswIndex<DenseSpace> = HnswIndex::new(22, HnswParams::default()).unwrap();
        for v in &rows {
            index.insert(v).unwrap();
        }
        assert_eq!(index.len(), 620);

        for row in 600..620 {
            let results = index.search(&rows[row], 5, None).unwrap();
            assert_eq!(results[0], (row, 0.0), "row {} not found first", row);
        }
    }

    #[test]
    fn test_duplicates_are_returned_in_row_order() {
        let rows = crowded_rows(22);
        let mut index: HnswIndex<DenseSpace> = HnswIndex::new(22, HnswParams::default()).unwrap();
        for v in &rows {
            index.insert(v).unwrap();
        }
        let results = index.search(&rows[300], 4, None).unwrap();
        let found: Vec<usize> = results.iter().map(|r| r.0).collect();
        assert_eq!(found, vec![300, 301, 302, 303]);
        assert!(results.iter().all(|r| r.1 == 0.0));
        assert_eq!(index.search(&rows[300], 400, None).unwrap().len(), 400);
    }

    #[test]
    fn test_binary_duplicates_keep_recall() {
        let mut rows: Vec<[u8; 3]> = vec![[0, 0, 0]; 300];
        rows.extend(vec![[0b1000_0000u8, 0, 0]; 300]);
        for i in 0..20usize {
            let bit = 2 + i;
            let mut v = [0b0100_0000u8, 0, 0];
            v[bit / 8] |= 0b1000_0000 >> (bit % 8);
            rows.push(v);
        }
        let mut index: HnswIndex<BinarySpace> = HnswIndex::new(3, HnswParams::default()).unwrap();
        for v in &rows {
            index.insert(v).unwrap();
        }
        for row in 600..620 {
            assert_eq!(index.search(&rows[row], 5, None).unwrap()[0], (row, 0.0));
        }
    }

    #[test]
    fn test_detached_rows_are_never_returned() {
        let mut index: HnswIndex<DenseSpace> = HnswIndex::new(2, HnswParams::default()).unwrap();
        assert_eq!(index.insert_detached(&[0.0, 0.0]).unwrap(), 0);
        assert!(index.search(&[1.0, 0.0], 3, None).unwrap().is_empty());

        index.insert(&[1.0, 0.0]).unwrap();
        index.insert_detached(&[0.0, 0.0]).unwrap();
        index.insert(&[0.0, 1.0]).unwrap();
        let found = index.search(&[1.0, 0.0], 5, None).unwrap();
        let rows: Vec<usize> = found.iter().map(|r| r.0).collect();
        assert_eq!(rows, vec![1, 3]);
        assert_eq!(index.brute_force(&[1.0, 0.0], 5).len(), 2);
        assert!(index.insert_detached(&[0.0]).is_err());
    }

    #[test]
    fn test_binary_space_exact_match_first() {
        let mut index: HnswIndex<BinarySpace> = HnswIndex::new(2, HnswParams::default()).unwrap();
        let rows: [[u8; 2]; 4] = [
            [0b1100_0000, 0],
            [0b1010_0000, 0],
            [0b0000_1111, 0],
            [0, 0b1000_0000],
        ];
        for r in &rows {
            index.insert(r).unwrap();
        }
        let results = index.search(&[0b1010_0000, 0], 4, None).unwrap();
        assert_eq!(results[0], (1, 0.0));
        assert_eq!(results[1], (0, 2.0));
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn test_build_is_deterministic() {
        let data = random_unit_vectors(200, 8, 3);
        let build = || {
            let mut index: HnswIndex<DenseSpace> =
                HnswIndex::new(8, HnswParams::default()).unwrap();
            for v in &data {
                index.insert(v).unwrap();
            }
            index
        };
        let a = build();
        let b = build();
        let q = &data[17];
        assert_eq!(a.search(q, 10, None).unwrap(), b.search(q, 10, None).unwrap());
    }

    #[test]
    fn test_serde_round_trip_preserves_results() {
        let mut index: HnswIndex<DenseSpace> = HnswIndex::new(8, HnswParams::default()).unwrap();
        let data = random_unit_vectors(100, 8, 11);
        for v in &data {
            index.insert(v).unwrap();
        }
        let bytes = bincode::serialize(&index).unwrap();
        let restored: HnswIndex<DenseSpace> = bincode::deserialize(&bytes).unwrap();
        for q in data.iter().take(10) {
            assert_eq!(index.search(q, 5, None).unwrap(), restored.search(q, 5, None).unwrap());
        }
    }

    #[test]
    fn test_invalid_params() {
        let params = HnswParams { max_connections: 1, ..HnswParams::default() };
        assert!(HnswIndex::<DenseSpace>::new(4, params).is_err());
    }

    #[test]
    fn test_visited_set() {
        let mut vs = VisitedSet::new(100);

        assert!(!vs.contains(5));
        assert!(vs.insert(5));
        assert!(vs.contains(5));
        assert!(!vs.insert(5));

        vs.clear();
        assert!(!vs.contains(5));
        assert!(vs.insert(5));
        assert!(vs.insert(500));
    }
}
