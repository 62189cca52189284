//! Match clustering
//!
//! Groups the exact matches of one reference/query orientation into colinear
//! chains. Matches are first partitioned with a union-find over the pairs that
//! could follow one another; chains are then extracted one at a time inside each
//! partition by dynamic programming over the matches still alive there.
//! Overlaps between chained matches are trimmed, and a chain retires its own
//! matches along with any match lying inside both of its spans.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ExactMatch, Strand};

/// Drift tolerated when no other FixedSeparation is configured
pub const DEFAULT_FIXED_SEPARATION: usize = 5;

/// How a chain's aggregate score is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterScoreMethod {
    /// Sum of the trimmed match lengths
    #[default]
    MatchLength,
    /// Reference extent from the first match start to the last match end
    ReferenceSpan,
}

/// Parameters for the clustering algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterParams {
    /// Largest gap allowed between consecutive matches
    pub maximum_separation: usize,
    /// Diagonal drift tolerated between consecutive matches; any value other
    /// than the default replaces the proportional bound
    pub fixed_separation: usize,
    /// Drift tolerated per unit of separation; negative disables separation checks
    pub separation_factor: f64,
    /// Chains scoring below this are discarded
    pub minimum_score: i64,
    pub score_method: ClusterScoreMethod,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            maximum_separation: 1000,
            fixed_separation: DEFAULT_FIXED_SEPARATION,
            separation_factor: 0.05,
            minimum_score: 200,
            score_method: ClusterScoreMethod::MatchLength,
        }
    }
}

/// A colinear chain of exact matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Matches in reference order, trimmed so consecutive ones never overlap
    pub matches: Vec<ExactMatch>,
    pub score: i64,
    pub strand: Strand,
}

impl Cluster {
    pub fn reference_span(&self) -> (usize, usize) {
        match (self.matches.first(), self.matches.last()) {
            (Some(first), Some(last)) => (first.reference_start, last.reference_end()),
            _ => (0, 0),
        }
    }

    pub fn query_span(&self) -> (usize, usize) {
        match (self.matches.first(), self.matches.last()) {
            (Some(first), Some(last)) => (first.query_start, last.query_end()),
            _ => (0, 0),
        }
    }

    /// Whether `m` overlaps this chain on the reference and on the query
    fn covers(&self, m: &ExactMatch) -> bool {
        let (ref_start, ref_end) = self.reference_span();
        let (query_start, query_end) = self.query_span();
        m.reference_start < ref_end
            && m.reference_end() > ref_start
            && m.query_start < query_end
            && m.query_end() > query_start
    }
}

/// Union-find over match indices; every root is the smallest index of its set
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            self.parent[a.max(b)] = a.min(b);
        }
    }
}

/// Clustering algorithm implementation
#[derive(Debug, Clone, Default)]
pub struct Clusterer {
    params: ClusterParams,
}

impl Clusterer {
    pub fn new(params: ClusterParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// Extract every chain from `matches` and keep those reaching the minimum score
    pub fn cluster(&self, matches: &[ExactMatch], strand: Strand) -> Vec<Cluster> {
        let mut sorted = matches.to_vec();
        sorted.sort_unstable_by_key(|m| (m.reference_start, m.query_start, m.length));

        let partitions = self.partitions(&sorted);
        let mut clusters = Vec::new();
        let mut extracted = 0usize;

        for mut alive in partitions.iter().cloned() {
            while !alive.is_empty() {
                let used = self.best_chain(&sorted, &alive);
                let chain = trim_overlaps(used.iter().map(|&k| sorted[k]).collect());
                extracted += 1;

                let cluster = Cluster {
                    score: self.score(&chain),
                    matches: chain,
                    strand,
                };

                // Chain indices ascend because the chain ascends on the reference
                alive.retain(|&k| used.binary_search(&k).is_err() && !cluster.covers(&sorted[k]));

                if cluster.score >= self.params.minimum_score {
                    clusters.push(cluster);
                }
            }
        }

        log::trace!(
            "Clustered {} matches in {} partitions into {} chains, {} kept",
            sorted.len(),
            partitions.len(),
            extracted,
            clusters.len()
        );
        clusters
    }

    /// Sets of matches connected by possible links, ordered by smallest member
    fn partitions(&self, sorted: &[ExactMatch]) -> Vec<Vec<usize>> {
        let mut by_query: Vec<usize> = (0..sorted.len()).collect();
        by_query.sort_by_key(|&k| {
            let m = &sorted[k];
            (m.query_start, m.reference_start, m.length)
        });

        let bounded = self.params.separation_factor >= 0.0;
        let reach = self.params.maximum_separation;
        let mut sets = DisjointSet::new(sorted.len());
        for (a, &i) in by_query.iter().enumerate() {
            let previous = &sorted[i];
            for &j in &by_query[a + 1..] {
                let current = &sorted[j];
                if bounded && current.query_start > previous.query_end() + reach {
                    break;
                }
                if self.link(previous, current).is_some() {
                    sets.union(i, j);
                }
            }
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for k in 0..sorted.len() {
            groups.entry(sets.find(k)).or_default().push(k);
        }
        groups.into_values().collect()
    }

    /// Indices of the highest-scoring chain over the alive matches, in reference order
    fn best_chain(&self, sorted: &[ExactMatch], alive: &[usize]) -> Vec<usize> {
        let n = alive.len();
        let mut dp_score = vec![0i64; n];
        let mut dp_parent = vec![None::<usize>; n];

        for i in 0..n {
            let current = &sorted[alive[i]];
            dp_score[i] = current.length as i64;

            for j in 0..i {
                let previous = &sorted[alive[j]];
                let Some(overlap) = self.link(previous, current) else {
                    continue;
                };

                let candidate_score = dp_score[j] + current.length as i64 - overlap as i64;
                if candidate_score > dp_score[i] {
                    dp_score[i] = candidate_score;
                    dp_parent[i] = Some(j);
                }
            }
        }

        let mut end = 0;
        for i in 1..n {
            if dp_score[i] > dp_score[end] {
                end = i;
            }
        }

        let mut chain = Vec::new();
        let mut current = Some(end);
        while let Some(idx) = current {
            chain.push(alive[idx]);
            current = dp_parent[idx];
        }
        chain.reverse();
        chain
    }

    /// Overlap to trim if `current` may follow `previous` in a chain
    fn link(&self, previous: &ExactMatch, current: &ExactMatch) -> Option<usize> {
        if previous.reference_start >= current.reference_start
            || previous.query_start >= current.query_start
        {
            return None;
        }

        let overlap = overlap(previous, current);
        if overlap >= current.length {
            return None;
        }

        if self.params.separation_factor >= 0.0 {
            let reference_gap = current.reference_start + overlap - previous.reference_end();
            let query_gap = current.query_start + overlap - previous.query_end();
            let separation = reference_gap.max(query_gap);
            if separation > self.params.maximum_separation {
                return None;
            }

            let drift = (current.diagonal() - previous.diagonal()).unsigned_abs() as f64;
            let fixed = self.params.fixed_separation as f64;
            let bound = if self.params.fixed_separation == DEFAULT_FIXED_SEPARATION {
                fixed.max(self.params.separation_factor * separation as f64)
            } else {
                fixed
            };
            if drift > bound {
                return None;
            }
        }

        Some(overlap)
    }

    fn score(&self, chain: &[ExactMatch]) -> i64 {
        match self.params.score_method {
            ClusterScoreMethod::MatchLength => chain.iter().map(|m| m.length as i64).sum(),
            ClusterScoreMethod::ReferenceSpan => match (chain.first(), chain.last()) {
                (Some(first), Some(last)) => (last.reference_end() - first.reference_start) as i64,
                _ => 0,
            },
        }
    }
}

/// Symbols `current` must lose so it no longer overlaps `previous` on either sequence
fn overlap(previous: &ExactMatch, current: &ExactMatch) -> usize {
    let on_reference = previous.reference_end().saturating_sub(current.reference_start);
    let on_query = previous.query_end().saturating_sub(current.query_start);
    on_reference.max(on_query)
}

/// Remove overlaps between consecutive chain members, keeping the longer match whole
fn trim_overlaps(mut chain: Vec<ExactMatch>) -> Vec<ExactMatch> {
    for t in 1..chain.len() {
        let overlap = overlap(&chain[t - 1], &chain[t]);
        if overlap == 0 {
            continue;
        }

        let next_length = chain[t].length;
        let previous = &mut chain[t - 1];
        if previous.length < next_length && previous.length > overlap {
            previous.length -= overlap;
        } else {
            let next = &mut chain[t];
            next.reference_start += overlap;
            next.query_start += overlap;
            next.length -= overlap;
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbounded(minimum_score: i64) -> Clusterer {
        Clusterer::new(ClusterParams {
            separation_factor: -1.0,
            fixed_separation: 0,
            minimum_score,
            ..Default::default()
        })
    }

    #[test]
    fn test_basic_chaining() {
        let matches = vec![
            ExactMatch::new(0, 0, 10),
            ExactMatch::new(12, 12, 10),
            ExactMatch::new(24, 25, 10),
        ];

        let clusters = Clusterer::new(ClusterParams {
            minimum_score: 0,
            ..Default::default()
        })
        .cluster(&matches, Strand::Forward);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].matches, matches);
        assert_eq!(clusters[0].score, 30);
    }

    #[test]
    fn test_touching_matches_retired_with_chain() {
        // The two longer matches win; the 3-long one lies inside both chain spans and is retired
        let matches = vec![
            ExactMatch::new(0, 5, 4),
            ExactMatch::new(4, 11, 4),
            ExactMatch::new(6, 12, 3),
            ExactMatch::new(9, 1, 4),
        ];
        let clusters = unbounded(2).cluster(&matches, Strand::Forward);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].matches, vec![ExactMatch::new(0, 5, 4), ExactMatch::new(4, 11, 4)]);
        assert_eq!(clusters[0].score, 8);
        assert_eq!(clusters[1].matches, vec![ExactMatch::new(9, 1, 4)]);
    }

    #[test]
    fn test_trim_keeps_longer_match() {
        let chain = trim_overlaps(vec![ExactMatch::new(2, 2, 4), ExactMatch::new(4, 4, 6)]);
        assert_eq!(chain, vec![ExactMatch::new(2, 2, 2), ExactMatch::new(4, 4, 6)]);

        let chain = trim_overlaps(vec![ExactMatch::new(0, 0, 6), ExactMatch::new(4, 4, 5)]);
        assert_eq!(chain, vec![ExactMatch::new(0, 0, 6), ExactMatch::new(6, 6, 3)]);
    }

    #[test]
    fn test_separation_limits_linking() {
        let matches = vec![ExactMatch::new(0, 0, 5), ExactMatch::new(40, 40, 5)];
        let clusterer = Clusterer::new(ClusterParams {
            maximum_separation: 10,
            minimum_score: 0,
            ..Default::default()
        });

        let clusters = clusterer.cluster(&matches, Strand::Forward);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.matches.len() == 1));

        assert_eq!(unbounded(0).cluster(&matches, Strand::Forward).len(), 1);
    }

    #[test]
    fn test_diagonal_drift_bound() {
        let matches = vec![ExactMatch::new(0, 0, 5), ExactMatch::new(10, 18, 5)];
        let strict = Clusterer::new(ClusterParams {
            fixed_separation: 5,
            separation_factor: 0.05,
            minimum_score: 0,
            ..Default::default()
        });
        assert_eq!(strict.cluster(&matches, Strand::Forward).len(), 2);

        let loose = Clusterer::new(ClusterParams {
            fixed_separation: 8,
            separation_factor: 0.05,
            minimum_score: 0,
            ..Default::default()
        });
        assert_eq!(loose.cluster(&matches, Strand::Forward).len(), 1);
    }

    #[test]
    fn test_minimum_score_filters_without_changing_chains() {
        let matches = vec![
            ExactMatch::new(0, 0, 3),
            ExactMatch::new(20, 40, 8),
            ExactMatch::new(30, 50, 4),
        ];
        let low = unbounded(0).cluster(&matches, Strand::Forward);
        let high = unbounded(12).cluster(&matches, Strand::Forward);

        assert!(high.len() <= low.len());
        for cluster in &high {
            assert!(low.contains(cluster));
            assert!(cluster.score >= 12);
        }
    }

    #[test]
    fn test_reference_span_scoring() {
        let matches = vec![ExactMatch::new(0, 0, 4), ExactMatch::new(10, 12, 4)];
        let clusterer = Clusterer::new(ClusterParams {
            separation_factor: -1.0,
            minimum_score: 0,
            score_method: ClusterScoreMethod::ReferenceSpan,
            ..Default::default()
        });
        let clusters = clusterer.cluster(&matches, Strand::Reverse);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].score, 14);
        assert_eq!(clusters[0].strand, Strand::Reverse);
        assert_eq!(clusters[0].reference_span(), (0, 14));
        assert_eq!(clusters[0].query_span(), (0, 16));
    }

    #[test]
    fn test_set_fixed_separation_replaces_proportional_bound() {
        // Separation 415 with drift 15: the proportional bound (20.75) would allow it
        let matches = vec![ExactMatch::new(0, 0, 10), ExactMatch::new(410, 425, 10)];
        let proportional = Clusterer::new(ClusterParams {
            minimum_score: 0,
            ..Default::default()
        });
        assert_eq!(proportional.cluster(&matches, Strand::Forward).len(), 1);

        let fixed = Clusterer::new(ClusterParams {
            fixed_separation: 10,
            minimum_score: 0,
            ..Default::default()
        });
        let clusters = fixed.cluster(&matches, Strand::Forward);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.matches.len() == 1));
    }

    #[test]
    fn test_repeated_query_block_keeps_both_copies() {
        let matches = vec![ExactMatch::new(0, 0, 24), ExactMatch::new(0, 64, 24)];
        let clusters = Clusterer::new(ClusterParams {
            minimum_score: 10,
            ..Default::default()
        })
        .cluster(&matches, Strand::Forward);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].matches, vec![ExactMatch::new(0, 0, 24)]);
        assert_eq!(clusters[1].matches, vec![ExactMatch::new(0, 64, 24)]);
    }

    #[test]
    fn test_distant_groups_chain_separately() {
        let near = vec![ExactMatch::new(0, 0, 10), ExactMatch::new(12, 12, 10)];
        let far = vec![ExactMatch::new(5000, 5000, 10), ExactMatch::new(5012, 5013, 10)];
        let clusterer = Clusterer::new(ClusterParams {
            minimum_score: 0,
            ..Default::default()
        });

        let mut matches = far.clone();
        matches.extend_from_slice(&near);
        let clusters = clusterer.cluster(&matches, Strand::Forward);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].matches, near);
        assert_eq!(clusters[1].matches, far);
        assert_eq!(clusters[0], clusterer.cluster(&near, Strand::Forward)[0]);
    }

    #[test]
    fn test_disjoint_set_roots_are_smallest_members() {
        let mut sets = DisjointSet::new(5);
        sets.union(4, 2);
        sets.union(2, 3);
        sets.union(1, 0);
        assert_eq!(sets.find(4), 2);
        assert_eq!(sets.find(3), 2);
        assert_eq!(sets.find(1), 0);
        sets.union(3, 1);
        assert!((0..5).all(|k| sets.find(k) == 0));
    }

    #[test]
    fn test_empty_input() {
        assert!(Clusterer::default().cluster(&[], Strand::Forward).is_empty());
    }
}
