//! Configuration handling for the PairAlign CLI
//!
//! Supports loading configuration from pairalign.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use clap::ValueEnum;
use pairalign_core::{Alphabet, DpParams, NucmerParams, SimilarityMatrix};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub nucmer: NucmerParams,
    #[serde(default)]
    pub dp: DpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default number of threads to use
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

/// Substitution scoring source for the direct aligners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatrixKind {
    Blosum62,
    /// Diagonal DNA matrix with match 3 and mismatch -1
    Nucmer,
    /// Match/mismatch constants over the chosen alphabet
    Diagonal,
}

impl MatrixKind {
    /// Alphabet assumed when none is given on the command line
    pub fn default_alphabet(&self) -> Alphabet {
        match self {
            MatrixKind::Blosum62 => Alphabet::Protein,
            MatrixKind::Nucmer | MatrixKind::Diagonal => Alphabet::Dna,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DpConfig {
    #[serde(default = "default_matrix")]
    pub matrix: MatrixKind,

    /// Match score for the diagonal matrix
    #[serde(default = "default_match_score")]
    pub match_score: i32,

    /// Mismatch score for the diagonal matrix
    #[serde(default = "default_mismatch_score")]
    pub mismatch_score: i32,

    #[serde(default = "default_dp_gap_open")]
    pub gap_open_cost: i32,

    #[serde(default = "default_dp_gap_extension")]
    pub gap_extension_cost: i32,
}

// Default value functions
fn default_threads() -> usize { num_cpus::get() }
fn default_true() -> bool { true }
fn default_matrix() -> MatrixKind { MatrixKind::Blosum62 }
fn default_match_score() -> i32 { 2 }
fn default_mismatch_score() -> i32 { -1 }
fn default_dp_gap_open() -> i32 { DpParams::default().gap_open_cost }
fn default_dp_gap_extension() -> i32 { DpParams::default().gap_extension_cost }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            pretty: true,
        }
    }
}

impl Default for DpConfig {
    fn default() -> Self {
        Self {
            matrix: default_matrix(),
            match_score: default_match_score(),
            mismatch_score: default_mismatch_score(),
            gap_open_cost: default_dp_gap_open(),
            gap_extension_cost: default_dp_gap_extension(),
        }
    }
}

impl DpConfig {
    pub fn params(&self) -> DpParams {
        DpParams {
            gap_open_cost: self.gap_open_cost,
            gap_extension_cost: self.gap_extension_cost,
        }
    }

    /// Build the configured substitution matrix over `alphabet`
    pub fn matrix(&self, alphabet: Alphabet) -> SimilarityMatrix {
        match self.matrix {
            MatrixKind::Blosum62 => SimilarityMatrix::blosum62(),
            MatrixKind::Nucmer => SimilarityMatrix::nucmer_default(),
            MatrixKind::Diagonal => {
                SimilarityMatrix::diagonal(alphabet, self.match_score, self.mismatch_score)
            }
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find pairalign.toml in current directory
                let default_path = PathBuf::from("pairalign.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: pairalign.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Configuration file content for these settings
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
