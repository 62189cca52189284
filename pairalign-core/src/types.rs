use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};

/// Gap symbol used in every aligned sequence
pub const GAP: u8 = b'-';

const NUCLEOTIDE_AMBIGUITY: &[u8] = b"RYSWKMBDHVN";
const PROTEIN_SYMBOLS: &[u8] = b"ACDEFGHIKLMNPQRSTVWYBZXUO*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alphabet {
    Dna,
    Rna,
    Protein,
}

impl Alphabet {
    /// Check whether an upper-case symbol belongs to this alphabet
    pub fn contains(&self, symbol: u8) -> bool {
        match self {
            Alphabet::Dna => b"ACGT".contains(&symbol) || NUCLEOTIDE_AMBIGUITY.contains(&symbol),
            Alphabet::Rna => b"ACGU".contains(&symbol) || NUCLEOTIDE_AMBIGUITY.contains(&symbol),
            Alphabet::Protein => PROTEIN_SYMBOLS.contains(&symbol),
        }
    }

    /// All symbols of the alphabet, unambiguous ones first
    pub fn symbols(&self) -> Vec<u8> {
        let mut symbols = match self {
            Alphabet::Dna => b"ACGT".to_vec(),
            Alphabet::Rna => b"ACGU".to_vec(),
            Alphabet::Protein => return PROTEIN_SYMBOLS.to_vec(),
        };
        symbols.extend_from_slice(NUCLEOTIDE_AMBIGUITY);
        symbols
    }

    pub fn is_nucleotide(&self) -> bool {
        matches!(self, Alphabet::Dna | Alphabet::Rna)
    }

    /// Watson-Crick complement, including ambiguity codes
    pub fn complement(&self, symbol: u8) -> Option<u8> {
        let complement = match (self, symbol) {
            (Alphabet::Protein, _) => return None,
            (Alphabet::Dna, b'A') => b'T',
            (Alphabet::Rna, b'A') => b'U',
            (Alphabet::Dna, b'T') | (Alphabet::Rna, b'U') => b'A',
            (_, b'C') => b'G',
            (_, b'G') => b'C',
            (_, b'R') => b'Y',
            (_, b'Y') => b'R',
            (_, b'K') => b'M',
            (_, b'M') => b'K',
            (_, b'B') => b'V',
            (_, b'V') => b'B',
            (_, b'D') => b'H',
            (_, b'H') => b'D',
            (_, s @ (b'S' | b'W' | b'N')) => s,
            _ => return None,
        };
        Some(complement)
    }
}

/// An immutable, validated biological sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    id: String,
    alphabet: Alphabet,
    symbols: Vec<u8>,
}

impl Sequence {
    /// Build a sequence, upper-casing and validating every symbol
    pub fn new<S: Into<String>>(id: S, alphabet: Alphabet, symbols: &[u8]) -> AlignResult<Self> {
        let symbols = symbols
            .iter()
            .map(|&s| {
                let upper = s.to_ascii_uppercase();
                if alphabet.contains(upper) {
                    Ok(upper)
                } else {
                    Err(AlignError::invalid_symbol(s, alphabet))
                }
            })
            .collect::<AlignResult<Vec<u8>>>()?;

        Ok(Self {
            id: id.into(),
            alphabet,
            symbols,
        })
    }

    pub fn dna<S: Into<String>>(id: S, symbols: &str) -> AlignResult<Self> {
        Self::new(id, Alphabet::Dna, symbols.as_bytes())
    }

    pub fn protein<S: Into<String>>(id: S, symbols: &str) -> AlignResult<Self> {
        Self::new(id, Alphabet::Protein, symbols.as_bytes())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Reverse complement of a nucleotide sequence; `None` for proteins
    pub fn reverse_complement(&self) -> Option<Sequence> {
        let symbols = self
            .symbols
            .iter()
            .rev()
            .map(|&s| self.alphabet.complement(s))
            .collect::<Option<Vec<u8>>>()?;

        Some(Sequence {
            id: self.id.clone(),
            alphabet: self.alphabet,
            symbols,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl From<bool> for Strand {
    fn from(forward: bool) -> Self {
        if forward {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// A maximal exact match between one reference and one query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExactMatch {
    pub reference_start: usize,
    pub query_start: usize,
    pub length: usize,
}

impl ExactMatch {
    pub fn new(reference_start: usize, query_start: usize, length: usize) -> Self {
        Self {
            reference_start,
            query_start,
            length,
        }
    }

    pub fn reference_end(&self) -> usize {
        self.reference_start + self.length
    }

    pub fn query_end(&self) -> usize {
        self.query_start + self.length
    }

    /// Query minus reference start; constant along a gap-free run
    pub fn diagonal(&self) -> i64 {
        self.query_start as i64 - self.reference_start as i64
    }
}

/// A contiguous gapped block of one reference/query pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedSegment {
    pub first_sequence: String,
    pub second_sequence: String,
    pub consensus: String,
    pub score: i64,
    /// Leading padding of the reference row when the two rows are drawn start-aligned
    pub first_offset: usize,
    /// Leading padding of the query row when the two rows are drawn start-aligned
    pub second_offset: usize,
    pub reference_start: usize,
    pub reference_end: usize,
    pub query_start: usize,
    pub query_end: usize,
    pub strand: Strand,
    /// Gap symbols in (first, second)
    pub insertions: (usize, usize),
}

impl AlignedSegment {
    /// Assemble a segment from its gapped rows and ungapped start coordinates
    pub fn from_rows(
        first: Vec<u8>,
        second: Vec<u8>,
        score: i64,
        reference_start: usize,
        query_start: usize,
        strand: Strand,
    ) -> Self {
        debug_assert_eq!(first.len(), second.len());

        let first_gaps = first.iter().filter(|&&s| s == GAP).count();
        let second_gaps = second.iter().filter(|&&s| s == GAP).count();
        let consensus = consensus(&first, &second);
        let (first_offset, second_offset) = display_offsets(reference_start, query_start);

        Self {
            reference_end: reference_start + first.len() - first_gaps,
            query_end: query_start + second.len() - second_gaps,
            first_sequence: String::from_utf8_lossy(&first).into_owned(),
            second_sequence: String::from_utf8_lossy(&second).into_owned(),
            consensus: String::from_utf8_lossy(&consensus).into_owned(),
            score,
            first_offset,
            second_offset,
            reference_start,
            query_start,
            strand,
            insertions: (first_gaps, second_gaps),
        }
    }

    /// Number of alignment columns
    pub fn len(&self) -> usize {
        self.first_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_sequence.is_empty()
    }
}

/// Resolve one consensus symbol per column
pub fn consensus(first: &[u8], second: &[u8]) -> Vec<u8> {
    first
        .iter()
        .zip(second)
        .map(|(&a, &b)| if a == GAP { b } else { a })
        .collect()
}

/// Padding that lines the two rows up at the segment start
pub fn display_offsets(reference_start: usize, query_start: usize) -> (usize, usize) {
    if reference_start > query_start {
        (0, reference_start - query_start)
    } else {
        (query_start - reference_start, 0)
    }
}

/// All segments found for one reference/query combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseAlignment {
    pub reference_id: String,
    pub query_id: String,
    pub segments: Vec<AlignedSegment>,
}

impl PairwiseAlignment {
    pub fn new(reference_id: String, query_id: String, mut segments: Vec<AlignedSegment>) -> Self {
        segments.sort_by(|a, b| {
            a.reference_start
                .cmp(&b.reference_start)
                .then(a.query_start.cmp(&b.query_start))
                .then(a.strand.cmp(&b.strand))
        });

        Self {
            reference_id,
            query_id,
            segments,
        }
    }
}

/// Ordered output of one orchestrated call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub alignments: Vec<PairwiseAlignment>,
}

impl AlignmentResult {
    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairwiseAlignment> {
        self.alignments.iter()
    }
}
