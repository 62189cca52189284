//! Maximal (unique) exact match enumeration

use std::borrow::Cow;
use std::ops::Range;

use super::{SeedParams, SuffixArray};
use crate::types::{ExactMatch, Sequence, Strand};

/// Matches found for one orientation of a query
#[derive(Debug, Clone)]
pub struct StrandMatches<'q> {
    pub strand: Strand,
    /// The query as searched: the input itself, or its reverse complement
    pub query: Cow<'q, Sequence>,
    pub matches: Vec<ExactMatch>,
}

/// Enumerates maximal exact matches between an indexed reference and a query
#[derive(Debug, Clone, Default)]
pub struct MumFinder {
    params: SeedParams,
}

impl MumFinder {
    pub fn new(params: SeedParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SeedParams {
        &self.params
    }

    /// Search the forward query and, unless disabled, its reverse complement
    pub fn find_stranded<'q>(
        &self,
        index: &SuffixArray<'_>,
        query: &'q Sequence,
    ) -> Vec<StrandMatches<'q>> {
        let mut stranded = vec![StrandMatches {
            strand: Strand::Forward,
            matches: self.find(index, query.as_bytes()),
            query: Cow::Borrowed(query),
        }];

        if !self.params.forward_only {
            if let Some(reverse) = query.reverse_complement() {
                stranded.push(StrandMatches {
                    strand: Strand::Reverse,
                    matches: self.find(index, reverse.as_bytes()),
                    query: Cow::Owned(reverse),
                });
            }
        }

        stranded
    }

    /// Maximal matches of at least `min_length`, sorted by (reference, query, length)
    pub fn find(&self, index: &SuffixArray<'_>, query: &[u8]) -> Vec<ExactMatch> {
        let min_length = self.params.min_length.max(1);
        let reference = index.text();
        if index.is_empty() || query.len() < min_length {
            return Vec::new();
        }

        let mut matches = Vec::new();
        // A reference position matched at the previous query position, and the match length
        let mut previous: Option<(usize, usize)> = None;

        for q in 0..query.len() {
            let pattern = &query[q..];

            let (interval, depth) = match previous {
                Some((r, length)) if length > min_length => {
                    let start = index.interval_around(r + 1, length - 1);
                    index.extend(pattern, start, length - 1)
                }
                _ => index.extend(pattern, 0..index.len(), 0),
            };

            previous = (depth >= min_length).then(|| (index.suffix(interval.start), depth));
            if depth < min_length {
                continue;
            }

            let left_maximal = |r: usize| q == 0 || r == 0 || reference[r - 1] != query[q - 1];

            if self.params.unique {
                if interval.len() == 1 {
                    let r = index.suffix(interval.start);
                    if left_maximal(r) {
                        matches.push(ExactMatch::new(r, q, depth));
                    }
                }
            } else {
                for (r, length) in shared_prefixes(index, interval, depth, min_length) {
                    if left_maximal(r) {
                        matches.push(ExactMatch::new(r, q, length));
                    }
                }
            }
        }

        let found = matches.len();
        let mut matches = remove_contained(matches);
        matches.sort_unstable();
        log::trace!("Found {} exact matches ({} after containment filter)", found, matches.len());
        matches
    }
}

/// Every reference suffix sharing at least `min_length` symbols with the pattern
/// whose deepest interval is `interval` at `depth`, with its shared length
fn shared_prefixes(
    index: &SuffixArray<'_>,
    interval: Range<usize>,
    depth: usize,
    min_length: usize,
) -> Vec<(usize, usize)> {
    let mut hits: Vec<(usize, usize)> =
        interval.clone().map(|k| (index.suffix(k), depth)).collect();

    let mut shared = depth;
    let mut k = interval.start;
    while k > 0 {
        shared = shared.min(index.lcp(k));
        if shared < min_length {
            break;
        }
        k -= 1;
        hits.push((index.suffix(k), shared));
    }

    shared = depth;
    let mut k = interval.end;
    while k < index.len() {
        shared = shared.min(index.lcp(k));
        if shared < min_length {
            break;
        }
        hits.push((index.suffix(k), shared));
        k += 1;
    }

    hits
}

/// Drop matches lying inside a longer match on the same diagonal
fn remove_contained(mut matches: Vec<ExactMatch>) -> Vec<ExactMatch> {
    matches.sort_unstable_by(|a, b| {
        a.diagonal()
            .cmp(&b.diagonal())
            .then(a.reference_start.cmp(&b.reference_start))
            .then(b.length.cmp(&a.length))
    });

    let mut kept: Vec<ExactMatch> = Vec::with_capacity(matches.len());
    let mut reach: Option<(i64, usize)> = None;
    for m in matches {
        match reach {
            Some((diagonal, end)) if diagonal == m.diagonal() && m.reference_end() <= end => {
                continue
            }
            _ => {
                reach = Some((m.diagonal(), m.reference_end()));
                kept.push(m);
            }
        }
    }
    kept
}
