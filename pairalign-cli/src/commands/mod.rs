//! Command implementations for the PairAlign CLI

pub mod config;
pub mod dp;
pub mod nucmer;

use anyhow::{Context, Result};
use clap::ValueEnum;
use pairalign_core::{Alphabet, Sequence};
use serde::Serialize;
use std::path::Path;

use crate::error::{CliError, CliResult};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphabetArg {
    Dna,
    Rna,
    Protein,
}

impl From<AlphabetArg> for Alphabet {
    fn from(arg: AlphabetArg) -> Self {
        match arg {
            AlphabetArg::Dna => Alphabet::Dna,
            AlphabetArg::Rna => Alphabet::Rna,
            AlphabetArg::Protein => Alphabet::Protein,
        }
    }
}

/// Parse one `ID=SEQUENCE` or bare `SEQUENCE` argument
///
/// Bare sequences are named `{prefix}{ordinal}`, counting from 1.
pub fn parse_sequence(
    argument: &str,
    alphabet: Alphabet,
    prefix: &str,
    ordinal: usize,
) -> CliResult<Sequence> {
    let (id, symbols) = match argument.split_once('=') {
        Some((id, symbols)) => {
            let id = id.trim();
            if id.is_empty() {
                return Err(CliError::invalid_sequence(argument, "identifier before '=' is empty"));
            }
            (id.to_string(), symbols.trim())
        }
        None => (format!("{}{}", prefix, ordinal), argument.trim()),
    };

    Sequence::new(id, alphabet, symbols.as_bytes())
        .map_err(|err| CliError::invalid_sequence(argument, err.to_string()))
}

pub fn parse_sequences(
    arguments: &[String],
    alphabet: Alphabet,
    prefix: &str,
) -> CliResult<Vec<Sequence>> {
    arguments
        .iter()
        .enumerate()
        .map(|(i, argument)| parse_sequence(argument, alphabet, prefix, i + 1))
        .collect()
}

/// Write `value` as JSON to `out`, or to stdout when no path is given
pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize alignment output")?;

    match out {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            log::info!("Output written to: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
