//! Direct two-sequence alignment with the affine-gap aligner

use anyhow::Result;
use clap::Args;
use pairalign_core::{AffineAligner, AlignedSegment, AlignmentMode, Alphabet};
use serde::Serialize;
use std::path::PathBuf;

use super::{parse_sequence, write_json, AlphabetArg};
use crate::config::{Config, DpConfig, MatrixKind};
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct DpArgs {
    /// First sequence (ID=SEQUENCE or SEQUENCE)
    pub first: String,

    /// Second sequence (ID=SEQUENCE or SEQUENCE)
    pub second: String,

    /// Output file (JSON); stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Substitution matrix
    #[arg(long)]
    pub matrix: Option<MatrixKind>,

    /// Symbol alphabet (defaults to the matrix's own)
    #[arg(long)]
    pub alphabet: Option<AlphabetArg>,

    /// Match score for the diagonal matrix
    #[arg(long = "match", allow_hyphen_values = true)]
    pub match_score: Option<i32>,

    /// Mismatch score for the diagonal matrix
    #[arg(long = "mismatch", allow_hyphen_values = true)]
    pub mismatch_score: Option<i32>,

    #[arg(long, allow_hyphen_values = true)]
    pub gap_open: Option<i32>,

    #[arg(long, allow_hyphen_values = true)]
    pub gap_extension: Option<i32>,

    /// Charge every gap column the open cost
    #[arg(long)]
    pub simple: bool,
}

impl DpArgs {
    pub fn new<A: Into<String>, B: Into<String>>(first: A, second: B) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            out: None,
            matrix: None,
            alphabet: None,
            match_score: None,
            mismatch_score: None,
            gap_open: None,
            gap_extension: None,
            simple: false,
        }
    }

    pub fn apply(&self, base: &DpConfig) -> DpConfig {
        let mut dp = base.clone();
        if let Some(v) = self.matrix { dp.matrix = v; }
        if let Some(v) = self.match_score { dp.match_score = v; }
        if let Some(v) = self.mismatch_score { dp.mismatch_score = v; }
        if let Some(v) = self.gap_open { dp.gap_open_cost = v; }
        if let Some(v) = self.gap_extension { dp.gap_extension_cost = v; }
        dp
    }
}

/// One aligned pair as printed by the `overlap` and `global` commands
#[derive(Debug, Serialize)]
pub struct DpReport {
    pub first_id: String,
    pub second_id: String,
    pub mode: AlignmentMode,
    pub segment: AlignedSegment,
}

pub fn execute(config: &Config, mode: AlignmentMode, args: DpArgs) -> Result<()> {
    log::info!("Starting {:?} alignment", mode);

    let report = run(config, mode, &args)?;

    log::info!("Alignment score: {}", report.segment.score);
    write_json(&report, args.out.as_deref(), config.general.pretty)
}

pub fn run(config: &Config, mode: AlignmentMode, args: &DpArgs) -> Result<DpReport, CliError> {
    let dp = args.apply(&config.dp);
    let alphabet: Alphabet = args
        .alphabet
        .map(Alphabet::from)
        .unwrap_or_else(|| dp.matrix.default_alphabet());
    log::debug!(
        "Matrix {:?} over {:?}, gaps {}/{}",
        dp.matrix,
        alphabet,
        dp.gap_open_cost,
        dp.gap_extension_cost
    );

    let first = parse_sequence(&args.first, alphabet, "seq", 1)?;
    let second = parse_sequence(&args.second, alphabet, "seq", 2)?;

    let params = dp.params();
    params.validate()?;
    let aligner = AffineAligner::new(dp.matrix(alphabet), params.gap_penalty(), mode)?;

    let segment = if args.simple {
        aligner.align_simple(&first, &second)?
    } else {
        aligner.align(&first, &second)?
    };

    Ok(DpReport {
        first_id: first.id().to_string(),
        second_id: second.id().to_string(),
        mode,
        segment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairalign_core::AlignError;

    #[test]
    fn test_global_protein_defaults() {
        let args = DpArgs::new("A=HEAGAWGHEE", "B=PAWHEAE");
        let report = run(&Config::default(), AlignmentMode::Global, &args).unwrap();

        assert_eq!(report.first_id, "A");
        assert_eq!(report.segment.score, 5);
        assert_eq!(report.segment.second_sequence, "---PAWHEAE");
    }

    #[test]
    fn test_overlap_protein_defaults() {
        let args = DpArgs::new("HEAGAWGHEE", "PAWHEAE");
        let report = run(&Config::default(), AlignmentMode::Overlap, &args).unwrap();

        assert_eq!(report.second_id, "seq2");
        assert_eq!(report.segment.score, 17);
        assert_eq!(report.segment.first_sequence, "GAWGHEE");
    }

    #[test]
    fn test_diagonal_dna_matrix() {
        let mut args = DpArgs::new("GAATTCAGTTA", "GGATCGA");
        args.matrix = Some(MatrixKind::Diagonal);
        args.match_score = Some(2);
        args.mismatch_score = Some(-1);
        args.gap_open = Some(-2);
        args.gap_extension = Some(-2);

        let report = run(&Config::default(), AlignmentMode::Global, &args).unwrap();
        assert_eq!(report.segment.score, 3);
    }

    #[test]
    fn test_protein_sequence_against_dna_matrix() {
        let mut args = DpArgs::new("PAWHEAE", "HEAGAWGHEE");
        args.matrix = Some(MatrixKind::Nucmer);

        let err = run(&Config::default(), AlignmentMode::Global, &args).unwrap_err();
        assert!(matches!(err, CliError::InvalidSequence { .. }));

        args.alphabet = Some(AlphabetArg::Protein);
        let err = run(&Config::default(), AlignmentMode::Global, &args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Alignment {
                source: AlignError::AlphabetMismatch { .. }
            }
        ));
    }
}
