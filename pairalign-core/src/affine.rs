//! Affine-gap dynamic-programming aligner
//!
//! Three-state Gotoh recurrence over a (|A|+1) x (|B|+1) grid. Scores are
//! kept for two rows at a time; every cell stores one traceback byte so the
//! optimal path can be recovered without keeping the full score matrices.

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};
use crate::scoring::{GapPenalty, Scorer, SymbolScorer};
use crate::types::{AlignedSegment, Sequence, Strand, GAP};

const NEG_INF: i64 = i64::MIN / 4;

// Traceback byte layout
const M_FROM_MASK: u8 = 0b0011;
const IX_EXTENDS: u8 = 0b0100;
const IY_EXTENDS: u8 = 0b1000;

/// Boundary and end-point handling of the DP grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// Leading and trailing gaps are charged on both sequences
    Global,
    /// Unaligned leading and trailing ends are free
    Overlap,
}

/// DP state a cell value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Diagonal move, A[i] against B[j]
    Match,
    /// Gap in A: consumes B[j]
    GapInFirst,
    /// Gap in B: consumes A[i]
    GapInSecond,
}

impl State {
    fn encode(self) -> u8 {
        match self {
            State::Match => 0,
            State::GapInFirst => 1,
            State::GapInSecond => 2,
        }
    }

    fn decode(bits: u8) -> Self {
        match bits & M_FROM_MASK {
            0 => State::Match,
            1 => State::GapInFirst,
            _ => State::GapInSecond,
        }
    }

    /// Pick the state holding the best of three values; ties favour the
    /// diagonal, then a gap in A
    fn best(m: i64, gap_in_first: i64, gap_in_second: i64) -> (State, i64) {
        let mut best = (State::Match, m);
        if gap_in_first > best.1 {
            best = (State::GapInFirst, gap_in_first);
        }
        if gap_in_second > best.1 {
            best = (State::GapInSecond, gap_in_second);
        }
        best
    }
}

/// Raw gapped rows produced by one DP run
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DpPath {
    pub first: Vec<u8>,
    pub second: Vec<u8>,
    pub score: i64,
    pub first_start: usize,
    pub second_start: usize,
}

/// One row of the three score matrices
struct Row {
    m: Vec<i64>,
    ix: Vec<i64>,
    iy: Vec<i64>,
}

impl Row {
    fn new(width: usize) -> Self {
        Self {
            m: vec![NEG_INF; width],
            ix: vec![NEG_INF; width],
            iy: vec![NEG_INF; width],
        }
    }

    fn best(&self, j: usize) -> (State, i64) {
        State::best(self.m[j], self.iy[j], self.ix[j])
    }
}

/// Affine-gap pairwise aligner producing one optimal alignment per pair
#[derive(Debug, Clone)]
pub struct AffineAligner<S: Scorer> {
    scorer: SymbolScorer<S>,
    mode: AlignmentMode,
}

impl<S: Scorer> AffineAligner<S> {
    pub fn new(substitution: S, gaps: GapPenalty, mode: AlignmentMode) -> AlignResult<Self> {
        gaps.validate()?;
        Ok(Self {
            scorer: SymbolScorer::new(substitution, gaps),
            mode,
        })
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn scorer(&self) -> &SymbolScorer<S> {
        &self.scorer
    }

    /// Align with affine gap costs
    pub fn align(&self, first: &Sequence, second: &Sequence) -> AlignResult<AlignedSegment> {
        self.align_with(first, second, self.scorer.gaps())
    }

    /// Align charging every gap symbol the open cost
    pub fn align_simple(&self, first: &Sequence, second: &Sequence) -> AlignResult<AlignedSegment> {
        self.align_with(first, second, GapPenalty::linear(self.scorer.gaps().open))
    }

    fn align_with(
        &self,
        first: &Sequence,
        second: &Sequence,
        gaps: GapPenalty,
    ) -> AlignResult<AlignedSegment> {
        if first.is_empty() || second.is_empty() {
            return Err(AlignError::empty_input(format!(
                "cannot align '{}' ({} symbols) with '{}' ({} symbols)",
                first.id(),
                first.len(),
                second.id(),
                second.len()
            )));
        }
        if first.alphabet() != second.alphabet() {
            return Err(AlignError::alphabet_mismatch(first.alphabet(), second.alphabet()));
        }
        if first.alphabet() != self.scorer.alphabet() {
            return Err(AlignError::alphabet_mismatch(first.alphabet(), self.scorer.alphabet()));
        }

        let path = self.run(first.as_bytes(), second.as_bytes(), gaps, self.mode)?;
        Ok(AlignedSegment::from_rows(
            path.first,
            path.second,
            path.score,
            path.first_start,
            path.second_start,
            Strand::Forward,
        ))
    }

    /// Fill the grid and trace back the optimal path
    pub(crate) fn run(
        &self,
        a: &[u8],
        b: &[u8],
        gaps: GapPenalty,
        mode: AlignmentMode,
    ) -> AlignResult<DpPath> {
        let n = a.len();
        let m = b.len();
        let width = m + 1;
        let open = gaps.open as i64;
        let extend = gaps.extension as i64;

        log::trace!("DP {:?} over {}x{} cells", mode, n, m);

        let mut trace = vec![0u8; (n + 1) * width];
        let mut prev = Row::new(width);
        let mut curr = Row::new(width);

        // Row 0
        prev.m[0] = 0;
        for j in 1..=m {
            match mode {
                AlignmentMode::Overlap => prev.m[j] = 0,
                AlignmentMode::Global => {
                    prev.iy[j] = open + (j as i64 - 1) * extend;
                    if j > 1 {
                        trace[j] |= IY_EXTENDS;
                    }
                }
            }
        }

        // Best end cell for overlap mode: last column top-down, then last row
        let mut overlap_end: Option<(usize, usize, State, i64)> = None;

        for i in 1..=n {
            curr.m.fill(NEG_INF);
            curr.ix.fill(NEG_INF);
            curr.iy.fill(NEG_INF);

            match mode {
                AlignmentMode::Overlap => curr.m[0] = 0,
                AlignmentMode::Global => {
                    curr.ix[0] = open + (i as i64 - 1) * extend;
                    if i > 1 {
                        trace[i * width] |= IX_EXTENDS;
                    }
                }
            }

            let symbol_a = a[i - 1];
            for j in 1..=m {
                let mut bits = 0u8;

                let (from, diagonal) = prev.best(j - 1);
                curr.m[j] = diagonal + self.scorer.score(symbol_a, b[j - 1])?;
                bits |= from.encode();

                let open_x = prev.m[j] + open;
                let extend_x = prev.ix[j] + extend;
                if extend_x > open_x {
                    curr.ix[j] = extend_x;
                    bits |= IX_EXTENDS;
                } else {
                    curr.ix[j] = open_x;
                }

                let open_y = curr.m[j - 1] + open;
                let extend_y = curr.iy[j - 1] + extend;
                if extend_y > open_y {
                    curr.iy[j] = extend_y;
                    bits |= IY_EXTENDS;
                } else {
                    curr.iy[j] = open_y;
                }

                trace[i * width + j] = bits;
            }

            if mode == AlignmentMode::Overlap {
                let (state, value) = curr.best(m);
                if overlap_end.map_or(true, |(_, _, _, best)| value > best) {
                    overlap_end = Some((i, m, state, value));
                }
                if i == n {
                    for j in 1..=m {
                        let (state, value) = curr.best(j);
                        if overlap_end.map_or(true, |(_, _, _, best)| value > best) {
                            overlap_end = Some((n, j, state, value));
                        }
                    }
                }
            }

            std::mem::swap(&mut prev, &mut curr);
        }

        // `prev` now holds row n
        let (end_i, end_j, state, score) = match overlap_end {
            Some(end) => end,
            None => {
                let (state, value) = prev.best(m);
                (n, m, state, value)
            }
        };

        Ok(self.traceback(a, b, &trace, width, (end_i, end_j), state, score, mode))
    }

    #[allow(clippy::too_many_arguments)]
    fn traceback(
        &self,
        a: &[u8],
        b: &[u8],
        trace: &[u8],
        width: usize,
        end: (usize, usize),
        mut state: State,
        score: i64,
        mode: AlignmentMode,
    ) -> DpPath {
        let (mut i, mut j) = end;
        let mut first = Vec::with_capacity(i + j);
        let mut second = Vec::with_capacity(i + j);

        let finished = |i: usize, j: usize| match mode {
            AlignmentMode::Global => i == 0 && j == 0,
            AlignmentMode::Overlap => i == 0 || j == 0,
        };

        while !finished(i, j) {
            let bits = trace[i * width + j];
            match state {
                State::Match => {
                    first.push(a[i - 1]);
                    second.push(b[j - 1]);
                    state = State::decode(bits);
                    i -= 1;
                    j -= 1;
                }
                State::GapInSecond => {
                    first.push(a[i - 1]);
                    second.push(GAP);
                    if bits & IX_EXTENDS == 0 {
                        state = State::Match;
                    }
                    i -= 1;
                }
                State::GapInFirst => {
                    first.push(GAP);
                    second.push(b[j - 1]);
                    if bits & IY_EXTENDS == 0 {
                        state = State::Match;
                    }
                    j -= 1;
                }
            }
        }

        first.reverse();
        second.reverse();

        DpPath {
            first,
            second,
            score,
            first_start: i,
            second_start: j,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{MatchMismatch, SimilarityMatrix};
    use crate::types::Alphabet;

    fn protein(id: &str, s: &str) -> Sequence {
        Sequence::protein(id, s).unwrap()
    }

    fn dna(id: &str, s: &str) -> Sequence {
        Sequence::dna(id, s).unwrap()
    }

    /// Score-only Gotoh used to cross-check the aligner
    fn reference_score(
        a: &[u8],
        b: &[u8],
        scorer: &impl Scorer,
        open: i64,
        extend: i64,
        overlap: bool,
    ) -> i64 {
        let (n, m) = (a.len(), b.len());
        let mut mm = vec![vec![NEG_INF; m + 1]; n + 1];
        let mut x = vec![vec![NEG_INF; m + 1]; n + 1];
        let mut y = vec![vec![NEG_INF; m + 1]; n + 1];
        mm[0][0] = 0;
        for i in 1..=n {
            if overlap { mm[i][0] = 0 } else { x[i][0] = open + (i as i64 - 1) * extend }
        }
        for j in 1..=m {
            if overlap { mm[0][j] = 0 } else { y[0][j] = open + (j as i64 - 1) * extend }
        }
        for i in 1..=n {
            for j in 1..=m {
                let s = scorer.substitution(a[i - 1], b[j - 1]).unwrap() as i64;
                mm[i][j] = s + mm[i - 1][j - 1].max(x[i - 1][j - 1]).max(y[i - 1][j - 1]);
                x[i][j] = (mm[i - 1][j] + open).max(x[i - 1][j] + extend);
                y[i][j] = (mm[i][j - 1] + open).max(y[i][j - 1] + extend);
            }
        }
        let h = |i: usize, j: usize| mm[i][j].max(x[i][j]).max(y[i][j]);
        if !overlap {
            return h(n, m);
        }
        let column = (1..=n).map(|i| h(i, m));
        let row = (1..=m).map(|j| h(n, j));
        column.chain(row).max().unwrap()
    }

    #[test]
    fn test_global_affine_protein() {
        let aligner = AffineAligner::new(
            SimilarityMatrix::blosum62(),
            GapPenalty::new(-8, -1),
            AlignmentMode::Global,
        )
        .unwrap();
        let seg = aligner
            .align(&protein("a", "HEAGAWGHEE"), &protein("b", "PAWHEAE"))
            .unwrap();

        assert_eq!(seg.score, 5);
        assert_eq!(seg.first_sequence, "HEAGAWGHEE");
        assert_eq!(seg.second_sequence, "---PAWHEAE");
        assert_eq!((seg.first_offset, seg.second_offset), (0, 0));
    }

    #[test]
    fn test_global_simple_gap() {
        let aligner = AffineAligner::new(
            SimilarityMatrix::blosum62(),
            GapPenalty::new(-8, -1),
            AlignmentMode::Global,
        )
        .unwrap();
        let seg = aligner
            .align_simple(&protein("a", "HEAGAWGHEE"), &protein("b", "PAWHEAE"))
            .unwrap();
        assert_eq!(seg.score, -8);
        assert_eq!(seg.first_sequence.len(), seg.second_sequence.len());

        let dna_aligner = AffineAligner::new(
            MatchMismatch::new(Alphabet::Dna, 2, -1),
            GapPenalty::linear(-2),
            AlignmentMode::Global,
        )
        .unwrap();
        let seg = dna_aligner
            .align(&dna("a", "GAATTCAGTTA"), &dna("b", "GGATCGA"))
            .unwrap();
        assert_eq!(seg.score, 3);
        assert_eq!(seg.first_sequence, "GAATTCAGTTA");
        assert_eq!(seg.second_sequence, "GGA-TC-G--A");
        assert_eq!(seg.insertions, (0, 4));
    }

    #[test]
    fn test_overlap_self_alignment_is_identity() {
        let matrix = SimilarityMatrix::blosum62();
        let aligner =
            AffineAligner::new(&matrix, GapPenalty::new(-10, -1), AlignmentMode::Overlap).unwrap();
        let a = protein("a", "MKTAYIAKQRQISFVKSHFSRQ");
        let seg = aligner.align(&a, &a).unwrap();

        let expected: i64 = a
            .as_bytes()
            .iter()
            .map(|&s| matrix.substitution(s, s).unwrap() as i64)
            .sum();
        assert_eq!(seg.score, expected);
        assert_eq!(seg.first_sequence, seg.second_sequence);
        assert_eq!(seg.insertions, (0, 0));
        assert_eq!((seg.reference_start, seg.query_start), (0, 0));
    }

    #[test]
    fn test_overlap_free_ends() {
        let aligner = AffineAligner::new(
            SimilarityMatrix::blosum62(),
            GapPenalty::new(-8, -1),
            AlignmentMode::Overlap,
        )
        .unwrap();
        let seg = aligner
            .align(&protein("a", "HEAGAWGHEE"), &protein("b", "PAWHEAE"))
            .unwrap();

        assert_eq!(seg.score, 17);
        assert_eq!(seg.first_sequence, "GAWGHEE");
        assert_eq!(seg.second_sequence, "PAW-HEA");
        assert_eq!((seg.reference_start, seg.query_start), (3, 0));
        assert_eq!((seg.first_offset, seg.second_offset), (0, 3));
    }

    #[test]
    fn test_overlap_matches_reference_recurrence() {
        let matrix = SimilarityMatrix::blosum62();
        let aligner =
            AffineAligner::new(&matrix, GapPenalty::new(-11, -1), AlignmentMode::Overlap).unwrap();
        let a = protein("a", "MVLSPADKTNVKAAWGKVGAHAGEYGAEALERMFLSFPTTKTYFPHF");
        let b = protein("b", "MVHLTPEEKSAVTALWGKVNVDEVGGEALGRLLVVYPWTQRFFESFGDLST");

        let seg = aligner.align(&a, &b).unwrap();
        let expected = reference_score(a.as_bytes(), b.as_bytes(), &matrix, -11, -1, true);
        assert_eq!(seg.score, expected);

        let rescored = SymbolScorer::new(&matrix, GapPenalty::new(-11, -1));
        let mut total = 0i64;
        let (first, second) = (seg.first_sequence.as_bytes(), seg.second_sequence.as_bytes());
        let mut k = 0;
        while k < first.len() {
            if first[k] == GAP || second[k] == GAP {
                let row = if first[k] == GAP { first } else { second };
                let run = row[k..].iter().take_while(|&&s| s == GAP).count() as i64;
                total += -11 + (run - 1) * -1;
                k += run as usize;
            } else {
                total += rescored.score(first[k], second[k]).unwrap();
                k += 1;
            }
        }
        assert_eq!(total, seg.score);
    }

    #[test]
    fn test_global_matches_reference_recurrence() {
        let matrix = SimilarityMatrix::nucmer_default();
        let aligner =
            AffineAligner::new(&matrix, GapPenalty::new(-13, -8), AlignmentMode::Global).unwrap();
        let a = dna("a", "ACGTTGACCATGACGTAGGACT");
        let b = dna("b", "ACGTGACCTTTGACGAGGAGCT");
        let seg = aligner.align(&a, &b).unwrap();
        assert_eq!(
            seg.score,
            reference_score(a.as_bytes(), b.as_bytes(), &matrix, -13, -8, false)
        );
        assert_eq!(seg.first_sequence.replace('-', ""), "ACGTTGACCATGACGTAGGACT");
        assert_eq!(seg.second_sequence.replace('-', ""), "ACGTGACCTTTGACGAGGAGCT");
    }

    #[test]
    fn test_input_errors() {
        let aligner = AffineAligner::new(
            SimilarityMatrix::nucmer_default(),
            GapPenalty::new(-13, -8),
            AlignmentMode::Global,
        )
        .unwrap();
        let empty = Sequence::dna("e", "").unwrap();
        assert!(matches!(
            aligner.align(&empty, &dna("a", "ACGT")),
            Err(AlignError::EmptyInput { .. })
        ));
        assert!(matches!(
            aligner.align(&dna("a", "ACGT"), &protein("p", "ACGT")),
            Err(AlignError::AlphabetMismatch { .. })
        ));
        assert!(AffineAligner::new(
            SimilarityMatrix::nucmer_default(),
            GapPenalty::new(1, -8),
            AlignmentMode::Global
        )
        .is_err());
    }
}
