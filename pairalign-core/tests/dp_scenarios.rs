use pairalign_core::{
    AffineAligner, AlignError, AlignmentMode, Alphabet, DpParams, GapPenalty, MatchMismatch,
    Sequence, SimilarityMatrix,
};

fn protein(id: &str, symbols: &str) -> Sequence {
    Sequence::protein(id, symbols).expect("valid protein")
}

fn blosum_aligner(mode: AlignmentMode) -> AffineAligner<SimilarityMatrix> {
    let gaps = DpParams::default().gap_penalty();
    AffineAligner::new(SimilarityMatrix::blosum62(), gaps, mode).unwrap()
}

#[test]
fn global_protein_alignment() {
    let aligner = blosum_aligner(AlignmentMode::Global);
    let segment = aligner
        .align(&protein("A", "HEAGAWGHEE"), &protein("B", "PAWHEAE"))
        .unwrap();

    assert_eq!(segment.score, 5);
    assert_eq!(segment.first_sequence, "HEAGAWGHEE");
    assert_eq!(segment.second_sequence, "---PAWHEAE");
    assert_eq!(segment.consensus, "HEAGAWGHEE");
}

#[test]
fn global_protein_alignment_with_linear_gaps() {
    let aligner = blosum_aligner(AlignmentMode::Global);
    let segment = aligner
        .align_simple(&protein("A", "HEAGAWGHEE"), &protein("B", "PAWHEAE"))
        .unwrap();
    assert_eq!(segment.score, -8);
    assert_eq!(segment.first_sequence.replace('-', ""), "HEAGAWGHEE");
    assert_eq!(segment.second_sequence.replace('-', ""), "PAWHEAE");
}

#[test]
fn overlap_protein_alignment() {
    let aligner = blosum_aligner(AlignmentMode::Overlap);
    let segment = aligner
        .align(&protein("A", "HEAGAWGHEE"), &protein("B", "PAWHEAE"))
        .unwrap();

    assert_eq!(segment.score, 17);
    assert_eq!(segment.first_sequence, "GAWGHEE");
    assert_eq!(segment.second_sequence, "PAW-HEA");
    assert_eq!((segment.first_offset, segment.second_offset), (0, 3));
}

#[test]
fn global_dna_with_match_mismatch_constants() {
    let aligner = AffineAligner::new(
        MatchMismatch::new(Alphabet::Dna, 2, -1),
        GapPenalty::linear(-2),
        AlignmentMode::Global,
    )
    .unwrap();
    let segment = aligner
        .align(
            &Sequence::dna("A", "GAATTCAGTTA").unwrap(),
            &Sequence::dna("B", "GGATCGA").unwrap(),
        )
        .unwrap();

    assert_eq!(segment.score, 3);
    assert_eq!(segment.first_sequence, "GAATTCAGTTA");
    assert_eq!(segment.second_sequence, "GGA-TC-G--A");
}

#[test]
fn overlap_self_alignment_scores_diagonal() {
    let matrix = SimilarityMatrix::blosum62();
    let aligner =
        AffineAligner::new(&matrix, GapPenalty::new(-10, -2), AlignmentMode::Overlap).unwrap();
    let sequence = protein("A", "MVLSPADKTNVKAAWGKVGAHAGEYGAEALERMFLSFPTTKTYFPHF");

    let segment = aligner.align(&sequence, &sequence).unwrap();
    let expected: i64 = sequence
        .as_bytes()
        .iter()
        .map(|&s| i64::from(pairalign_core::Scorer::substitution(&matrix, s, s).unwrap()))
        .sum();
    assert_eq!(segment.score, expected);
    assert_eq!(segment.first_sequence, segment.second_sequence);
}

#[test]
fn rejects_bad_inputs() {
    let aligner = blosum_aligner(AlignmentMode::Overlap);
    assert!(matches!(
        aligner.align(&protein("A", ""), &protein("B", "PAW")),
        Err(AlignError::EmptyInput { .. })
    ));
    assert!(matches!(
        aligner.align(&protein("A", "PAW"), &Sequence::dna("B", "ACGT").unwrap()),
        Err(AlignError::AlphabetMismatch { .. })
    ));
    assert!(matches!(
        AffineAligner::new(
            SimilarityMatrix::blosum62(),
            GapPenalty::new(-8, 3),
            AlignmentMode::Global
        ),
        Err(AlignError::InvalidConfiguration { .. })
    ));
}
