//! Exact-match seeding for the Nucmer-style aligner
//!
//! A suffix array is built once per reference and then queried with every
//! query (and its reverse complement) to enumerate maximal exact matches,
//! which form the basis for downstream clustering and stitching.

pub use crate::types::{ExactMatch, Strand};

pub mod mum;
pub mod suffix_array;

pub use mum::{MumFinder, StrandMatches};
pub use suffix_array::SuffixArray;


/// Parameters for exact-match seeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedParams {
    /// Minimum match length (LengthOfMUM)
    pub min_length: usize,
    /// Only report matches whose reference span occurs once in the reference
    pub unique: bool,
    /// Skip the reverse-complement search
    pub forward_only: bool,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self {
            min_length: 20,
            unique: true,
            forward_only: false,
        }
    }
}
