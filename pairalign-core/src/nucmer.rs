//! Seed-and-cluster pairwise aligner
//!
//! Runs exact-match finding, clustering and stitching over every
//! reference x query pair. Pairs are independent and processed on the rayon
//! pool; results land in (reference index, query index) order regardless of
//! completion order.

use rayon::prelude::*;

use crate::affine::{AffineAligner, AlignmentMode};
use crate::cluster::Clusterer;
use crate::config::NucmerParams;
use crate::error::{AlignError, AlignResult};
use crate::scoring::{GapModel, Scorer, SimilarityMatrix};
use crate::seed::{MumFinder, SuffixArray};
use crate::stitch::Stitcher;
use crate::types::{AlignmentResult, PairwiseAlignment, Sequence};

/// Long-range aligner over sets of references and queries
#[derive(Debug, Clone)]
pub struct NucmerAligner<S: Scorer = SimilarityMatrix> {
    params: NucmerParams,
    finder: MumFinder,
    clusterer: Clusterer,
    gap_filler: AffineAligner<S>,
}

impl NucmerAligner<SimilarityMatrix> {
    /// Aligner with the diagonal DNA matrix (match 3, mismatch -1)
    pub fn with_params(params: NucmerParams) -> AlignResult<Self> {
        Self::new(params, SimilarityMatrix::nucmer_default())
    }
}

impl<S: Scorer> NucmerAligner<S> {
    /// Validate the configuration eagerly and build the aligner
    pub fn new(params: NucmerParams, matrix: S) -> AlignResult<Self> {
        params.validate()?;

        Ok(Self {
            finder: MumFinder::new(params.seed_params()),
            clusterer: Clusterer::new(params.cluster_params()),
            gap_filler: AffineAligner::new(matrix, params.gap_penalty(), AlignmentMode::Global)?,
            params,
        })
    }

    pub fn params(&self) -> &NucmerParams {
        &self.params
    }

    /// Align every query against every reference with affine gap costs
    pub fn align(
        &self,
        references: &[Sequence],
        queries: &[Sequence],
    ) -> AlignResult<AlignmentResult> {
        self.align_all(references, queries, GapModel::Affine)
    }

    /// As `align`, charging every gap column the open cost
    pub fn align_simple(
        &self,
        references: &[Sequence],
        queries: &[Sequence],
    ) -> AlignResult<AlignmentResult> {
        self.align_all(references, queries, GapModel::Linear)
    }

    /// One reference against any number of queries
    pub fn align_one(
        &self,
        reference: &Sequence,
        queries: &[Sequence],
    ) -> AlignResult<AlignmentResult> {
        if queries.is_empty() {
            return Err(AlignError::invalid_configuration(
                "at least two sequences are required: a reference and one or more queries",
            ));
        }
        self.align(std::slice::from_ref(reference), queries)
    }

    /// First sequence is the reference, the rest are queries
    pub fn align_set(&self, sequences: &[Sequence]) -> AlignResult<AlignmentResult> {
        match sequences.split_first() {
            Some((reference, queries)) if !queries.is_empty() => {
                self.align(std::slice::from_ref(reference), queries)
            }
            _ => Err(AlignError::invalid_configuration(format!(
                "at least two sequences are required, got {}",
                sequences.len()
            ))),
        }
    }

    fn check_inputs(&self, references: &[Sequence], queries: &[Sequence]) -> AlignResult<()> {
        if references.is_empty() || queries.is_empty() {
            return Err(AlignError::empty_input(format!(
                "{} references and {} queries supplied",
                references.len(),
                queries.len()
            )));
        }

        let alphabet = self.gap_filler.scorer().alphabet();
        for sequence in references.iter().chain(queries) {
            if sequence.is_empty() {
                return Err(AlignError::empty_input(format!(
                    "sequence '{}' has no symbols",
                    sequence.id()
                )));
            }
            if sequence.alphabet() != alphabet {
                return Err(AlignError::alphabet_mismatch(sequence.alphabet(), alphabet));
            }
        }
        Ok(())
    }

    fn align_all(
        &self,
        references: &[Sequence],
        queries: &[Sequence],
        gap_model: GapModel,
    ) -> AlignResult<AlignmentResult> {
        self.check_inputs(references, queries)?;

        log::info!(
            "Aligning {} references against {} queries ({} pairs)",
            references.len(),
            queries.len(),
            references.len() * queries.len()
        );

        let indexes: Vec<SuffixArray<'_>> = references
            .par_iter()
            .map(|reference| SuffixArray::new(reference.as_bytes()))
            .collect();

        let slots: Vec<Option<PairwiseAlignment>> = (0..references.len() * queries.len())
            .into_par_iter()
            .map(|slot| {
                let (r, q) = (slot / queries.len(), slot % queries.len());
                self.align_pair(&references[r], &indexes[r], &queries[q], gap_model)
            })
            .collect::<AlignResult<_>>()?;

        let alignments: Vec<PairwiseAlignment> = slots.into_iter().flatten().collect();
        log::info!(
            "{} of {} pairs produced alignments",
            alignments.len(),
            references.len() * queries.len()
        );

        Ok(AlignmentResult { alignments })
    }

    fn align_pair(
        &self,
        reference: &Sequence,
        index: &SuffixArray<'_>,
        query: &Sequence,
        gap_model: GapModel,
    ) -> AlignResult<Option<PairwiseAlignment>> {
        let stitcher = Stitcher::new(&self.gap_filler, self.params.stitch_params(gap_model));
        let mut segments = Vec::new();
        let mut match_count = 0;
        let mut cluster_count = 0;

        for stranded in self.finder.find_stranded(index, query) {
            match_count += stranded.matches.len();
            let clusters = self.clusterer.cluster(&stranded.matches, stranded.strand);
            cluster_count += clusters.len();

            let query_bytes = stranded.query.as_bytes();
            for cluster in &clusters {
                segments.extend(stitcher.stitch(cluster, reference.as_bytes(), query_bytes)?);
            }
        }

        log::debug!(
            "{} vs {}: {} matches, {} clusters, {} segments",
            reference.id(),
            query.id(),
            match_count,
            cluster_count,
            segments.len()
        );

        if segments.is_empty() {
            return Ok(None);
        }
        Ok(Some(PairwiseAlignment::new(
            reference.id().to_string(),
            query.id().to_string(),
            segments,
        )))
    }
}
