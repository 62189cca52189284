//! Suffix array index over one reference
//!
//! Suffix order and LCP come from `bio` (SA-IS over the text plus a sentinel);
//! rank is their inverse. The arrays are indexed by position, read-only once
//! built and shared across threads.

use std::ops::Range;

use bio::data_structures::suffix_array::{lcp as lcp_array, suffix_array};

/// Lexicographically smallest byte, outside every alphabet
const SENTINEL: u8 = 0;

/// Suffix array with inverse (rank) and LCP arrays
#[derive(Debug, Clone)]
pub struct SuffixArray<'a> {
    text: &'a [u8],
    sa: Vec<usize>,
    rank: Vec<usize>,
    /// `lcp[k]` is the common prefix length of suffixes `sa[k - 1]` and `sa[k]`
    lcp: Vec<usize>,
}

impl<'a> SuffixArray<'a> {
    pub fn new(text: &'a [u8]) -> Self {
        let n = text.len();
        if n == 0 {
            return Self {
                text,
                sa: Vec::new(),
                rank: Vec::new(),
                lcp: Vec::new(),
            };
        }

        let mut terminated = Vec::with_capacity(n + 1);
        terminated.extend_from_slice(text);
        terminated.push(SENTINEL);

        // The sentinel suffix sorts first; drop it so ranks index the text alone
        let full = suffix_array(&terminated);
        let common = lcp_array(&terminated, &full);
        let sa: Vec<usize> = full[1..].to_vec();
        let lcp: Vec<usize> = (1..=n)
            .map(|r| match r {
                1 => 0,
                _ => common.get(r).unwrap_or(0).max(0) as usize,
            })
            .collect();

        let mut rank = vec![0usize; n];
        for (k, &suffix) in sa.iter().enumerate() {
            rank[suffix] = k;
        }

        log::trace!("Built suffix array over {} symbols", n);

        Self { text, sa, rank, lcp }
    }

    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Start position of the `k`-th smallest suffix
    pub fn suffix(&self, k: usize) -> usize {
        self.sa[k]
    }

    /// Position of the suffix starting at `position` in suffix order
    pub fn rank(&self, position: usize) -> usize {
        self.rank[position]
    }

    pub fn lcp(&self, k: usize) -> usize {
        self.lcp[k]
    }

    /// Symbol at `depth` into suffix `suffix`; `None` past the end sorts first
    #[inline]
    fn symbol_at(&self, suffix: usize, depth: usize) -> Option<u8> {
        self.text.get(suffix + depth).copied()
    }

    /// Narrow a suffix interval sharing `depth` symbols to those continuing with `symbol`
    pub fn narrow(&self, interval: Range<usize>, depth: usize, symbol: u8) -> Range<usize> {
        let slice = &self.sa[interval.clone()];
        let target = Some(symbol);
        let lo = slice.partition_point(|&s| self.symbol_at(s, depth) < target);
        let hi = lo + slice[lo..].partition_point(|&s| self.symbol_at(s, depth) <= target);
        interval.start + lo..interval.start + hi
    }

    /// All suffixes sharing at least `depth` symbols with the suffix at `position`
    pub fn interval_around(&self, position: usize, depth: usize) -> Range<usize> {
        if depth == 0 {
            return 0..self.sa.len();
        }
        let k = self.rank[position];
        let mut lo = k;
        while lo > 0 && self.lcp[lo] >= depth {
            lo -= 1;
        }
        let mut hi = k + 1;
        while hi < self.sa.len() && self.lcp[hi] >= depth {
            hi += 1;
        }
        lo..hi
    }

    /// Descend from an interval already matching `depth` symbols of `pattern`
    /// until the pattern ends or no suffix continues; returns the deepest
    /// non-empty interval and its depth
    pub fn extend(
        &self,
        pattern: &[u8],
        mut interval: Range<usize>,
        mut depth: usize,
    ) -> (Range<usize>, usize) {
        while depth < pattern.len() {
            let next = self.narrow(interval.clone(), depth, pattern[depth]);
            if next.is_empty() {
                break;
            }
            interval = next;
            depth += 1;
        }
        (interval, depth)
    }

    /// Reference positions where `pattern` occurs, in suffix order
    pub fn occurrences(&self, pattern: &[u8]) -> Vec<usize> {
        let (interval, depth) = self.extend(pattern, 0..self.sa.len(), 0);
        if depth < pattern.len() {
            return Vec::new();
        }
        self.sa[interval].to_vec()
    }
}
