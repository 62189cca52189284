//! Error handling for the PairAlign CLI

use pairalign_core::AlignError;
use thiserror::Error;

/// Main error type for PairAlign CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("Invalid sequence argument '{argument}': {message}")]
    InvalidSequence { argument: String, message: String },

    #[error("Alignment error: {source}")]
    Alignment {
        #[from]
        source: AlignError,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn invalid_sequence<A: Into<String>, M: Into<String>>(argument: A, message: M) -> Self {
        Self::InvalidSequence {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::InvalidSequence { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Pass sequences inline as ID=SEQUENCE or just SEQUENCE\n\
                 • Use --alphabet to pick dna, rna or protein symbols\n\
                 • Gap symbols ('-') are not allowed in input sequences",
            );
        }

        CliError::Alignment { source } => match source {
            AlignError::InvalidConfiguration { .. } => {
                message.push_str(
                    "\n\nSuggestions:\n\
                     • Set either --fixed-separation or --separation-factor, not both\n\
                     • Gap costs must be zero or negative\n\
                     • Use 'pairalign config --example' to see the defaults",
                );
            }
            AlignError::AlphabetMismatch { .. } => {
                message.push_str(
                    "\n\nSuggestions:\n\
                     • Use --matrix blosum62 for protein and --matrix nucmer for DNA\n\
                     • Make sure every sequence uses the same --alphabet",
                );
            }
            _ => {}
        },

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your pairalign.toml configuration file\n\
                 • Use 'pairalign config --example' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairalign_core::Alphabet;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::invalid_sequence("Q1=ACGJ", "bad symbol");
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("ID=SEQUENCE"));
    }

    #[test]
    fn test_alignment_error_conversion() {
        let err: CliError = AlignError::alphabet_mismatch(Alphabet::Dna, Alphabet::Protein).into();
        assert!(matches!(err, CliError::Alignment { .. }));
        assert!(format_error_with_suggestions(&err).contains("--matrix blosum62"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(matches!(cli_err, CliError::Io { .. }));
    }
}
