//! Cluster-to-alignment stitching
//!
//! Walks a cluster's matches in order. Exact matches pass through as
//! identical columns; the unmatched interval between two matches is either
//! filled (gaps only, or a global DP when both sides have symbols) or the
//! segment breaks there.

use crate::affine::{AffineAligner, AlignmentMode};
use crate::cluster::Cluster;
use crate::error::AlignResult;
use crate::scoring::{GapModel, GapPenalty, Scorer};
use crate::types::{AlignedSegment, ExactMatch, GAP};

/// Parameters controlling how clusters become segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StitchParams {
    /// Largest combined gap (reference + query) bridged inside one segment
    pub break_length: usize,
    /// Largest side of an interval the gap-fill DP may be run over
    pub maximum_alignment_length: usize,
    /// Charge gap runs with affine or linear costs
    pub gap_model: GapModel,
}

impl Default for StitchParams {
    fn default() -> Self {
        Self {
            break_length: 200,
            maximum_alignment_length: 10_000,
            gap_model: GapModel::Affine,
        }
    }
}

/// Segment under construction
struct Block {
    reference_start: usize,
    query_start: usize,
    reference_end: usize,
    query_end: usize,
    first: Vec<u8>,
    second: Vec<u8>,
}

impl Block {
    fn start(reference: &[u8], query: &[u8], m: &ExactMatch) -> Self {
        Self {
            reference_start: m.reference_start,
            query_start: m.query_start,
            reference_end: m.reference_end(),
            query_end: m.query_end(),
            first: reference[m.reference_start..m.reference_end()].to_vec(),
            second: query[m.query_start..m.query_end()].to_vec(),
        }
    }
}

/// Turns clusters into gapped segments using an aligner for gap filling
pub struct Stitcher<'a, S: Scorer> {
    aligner: &'a AffineAligner<S>,
    params: StitchParams,
}

impl<'a, S: Scorer> Stitcher<'a, S> {
    pub fn new(aligner: &'a AffineAligner<S>, params: StitchParams) -> Self {
        Self { aligner, params }
    }

    pub fn params(&self) -> &StitchParams {
        &self.params
    }

    fn gaps(&self) -> GapPenalty {
        let gaps = self.aligner.scorer().gaps();
        match self.params.gap_model {
            GapModel::Affine => gaps,
            GapModel::Linear => GapPenalty::linear(gaps.open),
        }
    }

    /// Segments of one cluster in reference order; `query` must be the
    /// orientation the cluster's matches were found in
    pub fn stitch(
        &self,
        cluster: &Cluster,
        reference: &[u8],
        query: &[u8],
    ) -> AlignResult<Vec<AlignedSegment>> {
        let mut blocks = Vec::new();
        let mut current: Option<Block> = None;

        for m in &cluster.matches {
            let Some(mut block) = current.take() else {
                current = Some(Block::start(reference, query, m));
                continue;
            };

            let reference_gap = m.reference_start - block.reference_end;
            let query_gap = m.query_start - block.query_end;
            let bridgeable = reference_gap + query_gap <= self.params.break_length;
            let bounded = reference_gap.max(query_gap) <= self.params.maximum_alignment_length;

            if bridgeable && bounded {
                let reference_interval = &reference[block.reference_end..m.reference_start];
                let query_interval = &query[block.query_end..m.query_start];
                self.fill(&mut block, reference_interval, query_interval)?;
                block.first.extend_from_slice(&reference[m.reference_start..m.reference_end()]);
                block.second.extend_from_slice(&query[m.query_start..m.query_end()]);
                block.reference_end = m.reference_end();
                block.query_end = m.query_end();
                current = Some(block);
            } else {
                if bridgeable {
                    log::warn!(
                        "Gap of {}x{} at reference {} exceeds maximum alignment length {}; \
                         breaking segment",
                        reference_gap,
                        query_gap,
                        block.reference_end,
                        self.params.maximum_alignment_length
                    );
                }
                blocks.push(block);
                current = Some(Block::start(reference, query, m));
            }
        }
        blocks.extend(current);

        let scorer = self.aligner.scorer();
        blocks
            .into_iter()
            .map(|block| -> AlignResult<AlignedSegment> {
                let score =
                    scorer.score_columns(&block.first, &block.second, self.params.gap_model)?;
                Ok(AlignedSegment::from_rows(
                    block.first,
                    block.second,
                    score,
                    block.reference_start,
                    block.query_start,
                    cluster.strand,
                ))
            })
            .collect()
    }

    /// Append the columns covering one unmatched interval
    fn fill(&self, block: &mut Block, reference_gap: &[u8], query_gap: &[u8]) -> AlignResult<()> {
        match (reference_gap.is_empty(), query_gap.is_empty()) {
            (true, true) => {}
            (true, false) | (false, true) => {
                block.first.extend_from_slice(reference_gap);
                block.first.extend(std::iter::repeat(GAP).take(query_gap.len()));
                block.second.extend(std::iter::repeat(GAP).take(reference_gap.len()));
                block.second.extend_from_slice(query_gap);
            }
            (false, false) => {
                log::trace!(
                    "Filling {}x{} interval at reference {}",
                    reference_gap.len(),
                    query_gap.len(),
                    block.reference_end
                );
                let path = self
                    .aligner
                    .run(reference_gap, query_gap, self.gaps(), AlignmentMode::Global)?;
                block.first.extend_from_slice(&path.first);
                block.second.extend_from_slice(&path.second);
            }
        }
        Ok(())
    }
}
