//! Error handling for PairAlign core

use crate::types::Alphabet;
use thiserror::Error;

/// Errors surfaced by every alignment entry point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Alphabet mismatch: {first:?} vs {second:?}")]
    AlphabetMismatch { first: Alphabet, second: Alphabet },

    #[error("Invalid symbol '{symbol}' for {alphabet:?} alphabet")]
    InvalidSymbol { symbol: char, alphabet: Alphabet },

    #[error("Empty input: {message}")]
    EmptyInput { message: String },
}

impl AlignError {
    pub fn invalid_configuration<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfiguration { message: message.into() }
    }

    pub fn alphabet_mismatch(first: Alphabet, second: Alphabet) -> Self {
        Self::AlphabetMismatch { first, second }
    }

    pub fn invalid_symbol(symbol: u8, alphabet: Alphabet) -> Self {
        Self::InvalidSymbol {
            symbol: symbol as char,
            alphabet,
        }
    }

    pub fn empty_input<S: Into<String>>(message: S) -> Self {
        Self::EmptyInput { message: message.into() }
    }
}

/// Result type for alignment operations
pub type AlignResult<T> = Result<T, AlignError>;
