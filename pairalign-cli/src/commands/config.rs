//! Config command implementation - print or write the configuration file

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::CliError;

pub fn execute(config: &Config, example: bool, out: Option<PathBuf>) -> Result<()> {
    let defaults = Config::default();
    let selected = if example { &defaults } else { config };

    match out {
        Some(path) => {
            if path.exists() {
                return Err(CliError::validation(format!(
                    "refusing to overwrite existing file: {}",
                    path.display()
                ))
                .into());
            }
            selected.save_to_file(&path)?;
            log::info!("Configuration written to: {}", path.display());
        }
        None => print!("{}", selected.to_toml()?),
    }

    Ok(())
}
