//! Nucmer command implementation - seed, cluster and stitch references against queries

use anyhow::Result;
use clap::Args;
use pairalign_core::{Alphabet, AlignmentResult, NucmerAligner, NucmerParams};
use std::path::PathBuf;

use super::{parse_sequences, write_json};
use crate::config::Config;
use crate::error::CliError;

#[derive(Args, Debug, Clone, Default)]
pub struct NucmerArgs {
    /// Reference sequences (ID=SEQUENCE or SEQUENCE)
    #[arg(long = "reference", required = true, num_args = 1..)]
    pub references: Vec<String>,

    /// Query sequences (ID=SEQUENCE or SEQUENCE)
    #[arg(long = "query", required = true, num_args = 1..)]
    pub queries: Vec<String>,

    /// Output file (JSON); stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Charge every gap column the open cost
    #[arg(long)]
    pub simple: bool,

    /// Minimum exact-match length
    #[arg(long)]
    pub min_match: Option<i64>,

    /// Minimum cluster score
    #[arg(long)]
    pub min_score: Option<i64>,

    /// Largest combined gap bridged inside one segment
    #[arg(long)]
    pub break_length: Option<i64>,

    /// Largest gap between chained matches
    #[arg(long)]
    pub max_separation: Option<i64>,

    /// Diagonal drift always tolerated between chained matches
    #[arg(long)]
    pub fixed_separation: Option<i64>,

    /// Drift tolerated per unit of separation (negative disables the check)
    #[arg(long, allow_hyphen_values = true)]
    pub separation_factor: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub gap_open: Option<i32>,

    #[arg(long, allow_hyphen_values = true)]
    pub gap_extension: Option<i32>,

    /// Skip the reverse-complement search
    #[arg(long)]
    pub forward_only: bool,

    /// Seed from repeated reference matches too
    #[arg(long)]
    pub all_matches: bool,
}

impl NucmerArgs {
    /// Configuration values overridden by the flags that were given
    pub fn apply(&self, base: &NucmerParams) -> NucmerParams {
        let mut params = base.clone();
        if let Some(v) = self.min_match { params.length_of_mum = v; }
        if let Some(v) = self.min_score { params.minimum_score = v; }
        if let Some(v) = self.break_length { params.break_length = v; }
        if let Some(v) = self.max_separation { params.maximum_separation = v; }
        if let Some(v) = self.fixed_separation { params.fixed_separation = v; }
        if let Some(v) = self.separation_factor { params.separation_factor = v; }
        if let Some(v) = self.gap_open { params.gap_open_cost = v; }
        if let Some(v) = self.gap_extension { params.gap_extension_cost = v; }
        if self.forward_only {
            params.forward_only = true;
        }
        if self.all_matches {
            params.unique_matches = false;
        }
        params
    }
}

pub fn execute(config: &Config, args: NucmerArgs) -> Result<()> {
    log::info!("Starting seeded alignment");

    let result = run(config, &args)?;

    log::info!(
        "Aligned {} pair(s) into {} segment(s)",
        result.len(),
        result.iter().map(|a| a.segments.len()).sum::<usize>()
    );
    write_json(&result, args.out.as_deref(), config.general.pretty)
}

/// Parse the inline sequences and run the aligner
pub fn run(config: &Config, args: &NucmerArgs) -> Result<AlignmentResult, CliError> {
    let params = args.apply(&config.nucmer);
    log::debug!("Nucmer parameters: {:?}", params);

    let references = parse_sequences(&args.references, Alphabet::Dna, "ref")?;
    let queries = parse_sequences(&args.queries, Alphabet::Dna, "qry")?;

    let aligner = NucmerAligner::with_params(params)?;
    let result = if args.simple {
        aligner.align_simple(&references, &queries)?
    } else {
        aligner.align(&references, &queries)?
    };

    Ok(result)
}
