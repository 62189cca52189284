//! Symbol scoring for the aligners
//!
//! Substitution scores come from a [`Scorer`]: either a full similarity
//! matrix or plain match/mismatch constants. [`SymbolScorer`] pairs one
//! with affine gap costs and also scores finished gapped rows.

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};
use crate::types::{Alphabet, GAP};

const BLOSUM62_SYMBOLS: &[u8] = b"ARNDCQEGHILKMFPSTWYVBZX*";

#[rustfmt::skip]
const BLOSUM62: [[i32; 24]; 24] = [
    [ 4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1,  0, -4],
    [-1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1,  0, -1, -4],
    [-2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  3,  0, -1, -4],
    [-2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4,  1, -1, -4],
    [ 0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -3, -2, -4],
    [-1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0,  3, -1, -4],
    [-1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4],
    [ 0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -2, -1, -4],
    [-2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0,  0, -1, -4],
    [-1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3, -3, -1, -4],
    [-1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4, -3, -1, -4],
    [-1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0,  1, -1, -4],
    [-1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3, -1, -1, -4],
    [-2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3, -3, -1, -4],
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -1, -2, -4],
    [ 1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0,  0,  0, -4],
    [ 0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1,  0, -4],
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -3, -2, -4],
    [-2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -2, -1, -4],
    [ 0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3, -2, -1, -4],
    [-2, -1,  3,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4,  1, -1, -4],
    [-1,  0,  0,  1, -3,  3,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4],
    [ 0, -1, -1, -1, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -2,  0,  0, -2, -1, -1, -1, -1, -1, -4],
    [-4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1],
];

/// Substitution scoring between two non-gap symbols
pub trait Scorer: Send + Sync {
    /// Score of aligning `a` against `b`
    fn substitution(&self, a: u8, b: u8) -> AlignResult<i32>;

    /// The alphabet the scorer is defined over
    fn alphabet(&self) -> Alphabet;
}

impl<T: Scorer + ?Sized> Scorer for &T {
    #[inline(always)]
    fn substitution(&self, a: u8, b: u8) -> AlignResult<i32> {
        (**self).substitution(a, b)
    }

    fn alphabet(&self) -> Alphabet {
        (**self).alphabet()
    }
}

/// Square substitution matrix over a declared symbol set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityMatrix {
    alphabet: Alphabet,
    symbols: Vec<u8>,
    index: Vec<Option<usize>>,
    scores: Vec<i32>,
}

impl SimilarityMatrix {
    /// Build a matrix from explicit rows, one per symbol
    pub fn from_rows(alphabet: Alphabet, symbols: &[u8], rows: &[Vec<i32>]) -> AlignResult<Self> {
        let n = symbols.len();
        if n == 0 {
            return Err(AlignError::invalid_configuration("similarity matrix has no symbols"));
        }
        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
            return Err(AlignError::invalid_configuration(format!(
                "similarity matrix must be {}x{}",
                n, n
            )));
        }

        let mut index = vec![None; 256];
        for (i, &symbol) in symbols.iter().enumerate() {
            let upper = symbol.to_ascii_uppercase();
            if !alphabet.contains(upper) {
                return Err(AlignError::invalid_symbol(symbol, alphabet));
            }
            if index[upper as usize].is_some() {
                return Err(AlignError::invalid_configuration(format!(
                    "symbol '{}' declared twice",
                    upper as char
                )));
            }
            index[upper as usize] = Some(i);
        }

        Ok(Self {
            alphabet,
            symbols: symbols.iter().map(|s| s.to_ascii_uppercase()).collect(),
            index,
            scores: rows.iter().flatten().copied().collect(),
        })
    }

    /// Constant match/mismatch matrix over every symbol of the alphabet
    pub fn diagonal(alphabet: Alphabet, matched: i32, mismatched: i32) -> Self {
        let symbols = alphabet.symbols();
        let rows: Vec<Vec<i32>> = (0..symbols.len())
            .map(|i| {
                (0..symbols.len())
                    .map(|j| if i == j { matched } else { mismatched })
                    .collect()
            })
            .collect();

        let mut index = vec![None; 256];
        for (i, &symbol) in symbols.iter().enumerate() {
            index[symbol as usize] = Some(i);
        }

        Self {
            alphabet,
            symbols,
            index,
            scores: rows.into_iter().flatten().collect(),
        }
    }

    /// Diagonal DNA matrix used by the seeded aligner
    pub fn nucmer_default() -> Self {
        Self::diagonal(Alphabet::Dna, 3, -1)
    }

    pub fn blosum62() -> Self {
        let mut index = vec![None; 256];
        for (i, &symbol) in BLOSUM62_SYMBOLS.iter().enumerate() {
            index[symbol as usize] = Some(i);
        }

        Self {
            alphabet: Alphabet::Protein,
            symbols: BLOSUM62_SYMBOLS.to_vec(),
            index,
            scores: BLOSUM62.iter().flatten().copied().collect(),
        }
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    fn position(&self, symbol: u8) -> AlignResult<usize> {
        self.index[symbol.to_ascii_uppercase() as usize]
            .ok_or_else(|| AlignError::invalid_symbol(symbol, self.alphabet))
    }
}

impl Scorer for SimilarityMatrix {
    #[inline]
    fn substitution(&self, a: u8, b: u8) -> AlignResult<i32> {
        let row = self.position(a)?;
        let col = self.position(b)?;
        Ok(self.scores[row * self.symbols.len() + col])
    }

    fn alphabet(&self) -> Alphabet {
        self.alphabet
    }
}

/// Match/mismatch constants without a full matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchMismatch {
    pub alphabet: Alphabet,
    pub matched: i32,
    pub mismatched: i32,
}

impl MatchMismatch {
    pub fn new(alphabet: Alphabet, matched: i32, mismatched: i32) -> Self {
        Self {
            alphabet,
            matched,
            mismatched,
        }
    }
}

impl Scorer for MatchMismatch {
    #[inline]
    fn substitution(&self, a: u8, b: u8) -> AlignResult<i32> {
        let (a, b) = (a.to_ascii_uppercase(), b.to_ascii_uppercase());
        for symbol in [a, b] {
            if !self.alphabet.contains(symbol) {
                return Err(AlignError::invalid_symbol(symbol, self.alphabet));
            }
        }
        Ok(if a == b { self.matched } else { self.mismatched })
    }

    fn alphabet(&self) -> Alphabet {
        self.alphabet
    }
}

/// Affine gap costs; both are non-positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapPenalty {
    pub open: i32,
    pub extension: i32,
}

impl GapPenalty {
    pub fn new(open: i32, extension: i32) -> Self {
        Self { open, extension }
    }

    /// Linear costs: every gap symbol costs `open`
    pub fn linear(open: i32) -> Self {
        Self {
            open,
            extension: open,
        }
    }

    pub fn validate(&self) -> AlignResult<()> {
        if self.open > 0 || self.extension > 0 {
            return Err(AlignError::invalid_configuration(format!(
                "gap costs must not be positive (open {}, extension {})",
                self.open, self.extension
            )));
        }
        Ok(())
    }
}

/// How runs of gap columns are charged when scoring finished rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapModel {
    /// A run of k gaps costs `open + k * extension`
    Affine,
    /// Every gap column costs `open`
    Linear,
}

/// Substitution scorer combined with gap costs
#[derive(Debug, Clone)]
pub struct SymbolScorer<S: Scorer> {
    substitution: S,
    gaps: GapPenalty,
}

impl<S: Scorer> SymbolScorer<S> {
    pub fn new(substitution: S, gaps: GapPenalty) -> Self {
        Self { substitution, gaps }
    }

    pub fn gaps(&self) -> GapPenalty {
        self.gaps
    }

    pub fn substitution_scorer(&self) -> &S {
        &self.substitution
    }

    pub fn alphabet(&self) -> Alphabet {
        self.substitution.alphabet()
    }

    /// Score one column; a gap on either side is never looked up in the matrix
    #[inline]
    pub fn score(&self, a: u8, b: u8) -> AlignResult<i64> {
        if a == GAP || b == GAP {
            return Ok(self.gaps.open as i64);
        }
        self.substitution.substitution(a, b).map(i64::from)
    }

    /// Score two equal-length gapped rows column by column
    pub fn score_columns(&self, first: &[u8], second: &[u8], model: GapModel) -> AlignResult<i64> {
        let mut total = 0i64;
        let mut column = 0;

        while column < first.len() {
            let (a, b) = (first[column], second[column]);
            if a != GAP && b != GAP {
                total += self.substitution.substitution(a, b)? as i64;
                column += 1;
                continue;
            }

            let row = if a == GAP { first } else { second };
            let run = row[column..].iter().take_while(|&&s| s == GAP).count();
            total += match model {
                GapModel::Affine => self.gaps.open as i64 + run as i64 * self.gaps.extension as i64,
                GapModel::Linear => run as i64 * self.gaps.open as i64,
            };
            column += run;
        }

        Ok(total)
    }
}
