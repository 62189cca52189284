//! PairAlign Core Library
//!
//! Pairwise sequence alignment: an affine-gap dynamic-programming aligner
//! (global and overlap modes) and a seed-and-cluster aligner that finds
//! maximal unique matches, chains them and stitches the chains into gapped
//! segments.

pub mod affine;
pub mod cluster;
pub mod config;
pub mod error;
pub mod nucmer;
pub mod scoring;
pub mod seed;
pub mod stitch;
pub mod types;

// Re-export commonly used types and functions
pub use affine::{AffineAligner, AlignmentMode};
pub use cluster::{Cluster, ClusterParams, ClusterScoreMethod, Clusterer};
pub use config::{DpParams, NucmerParams};
pub use error::{AlignError, AlignResult};
pub use nucmer::NucmerAligner;
pub use scoring::{GapModel, GapPenalty, MatchMismatch, Scorer, SimilarityMatrix, SymbolScorer};
pub use seed::{MumFinder, SeedParams, StrandMatches, SuffixArray};
pub use stitch::{StitchParams, Stitcher};
pub use types::{
    AlignedSegment, Alphabet, AlignmentResult, ExactMatch, PairwiseAlignment, Sequence, Strand, GAP,
};

/// Version information for the PairAlign core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
