use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pairalign_core::AlignmentMode;
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use commands::dp::DpArgs;
use commands::nucmer::NucmerArgs;
use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "pairalign")]
#[command(about = "PairAlign - seeded and affine-gap pairwise sequence alignment")]
#[command(version)]
#[command(long_about = "
PairAlign aligns sequences pairwise. The nucmer command finds maximal unique
matches, chains them and stitches the chains into gapped segments; the overlap
and global commands run the affine-gap dynamic-programming aligner directly.

Examples:
  pairalign nucmer --reference R1=ATGCGCATCCCC --query Q1=CCGCGCCCCCTCAGCT --min-match 3
  pairalign overlap HEAGAWGHEE PAWHEAE
  pairalign global A=GAATTCAGTTA B=GGATCGA --matrix diagonal --match 2 --mismatch -1
  pairalign config --example > pairalign.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed, cluster and stitch every query against every reference
    Nucmer(NucmerArgs),

    /// Overlap alignment: unaligned ends are free
    Overlap(DpArgs),

    /// Global alignment of both sequences end to end
    Global(DpArgs),

    /// Print or write the configuration file
    Config {
        /// Print the default configuration instead of the loaded one
        #[arg(long)]
        example: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet)?;

    let config =
        Config::load(cli.config.as_deref()).map_err(|err| CliError::config(format!("{:#}", err)))?;

    let threads = cli.threads.unwrap_or(config.general.threads);
    if threads == 0 {
        return Err(CliError::validation("thread count must be at least 1").into());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to set thread count")?;
    log::debug!("Using {} thread(s)", threads);

    match cli.command {
        Commands::Nucmer(args) => commands::nucmer::execute(&config, args)?,
        Commands::Overlap(args) => commands::dp::execute(&config, AlignmentMode::Overlap, args)?,
        Commands::Global(args) => commands::dp::execute(&config, AlignmentMode::Global, args)?,
        Commands::Config { example, out } => commands::config::execute(&config, example, out)?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<CliError>() {
            Some(cli_err) => print_error_and_exit(cli_err),
            None => Err(err),
        },
    }
}
