//! Seeded random fixtures shared by the tests and benchmarks

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DNA: &[u8] = b"ACGT";

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `length` symbols drawn uniformly from `alphabet`
pub fn random_sequence(rng: &mut StdRng, length: usize, alphabet: &[u8]) -> Vec<u8> {
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

pub fn random_dna(seed: u64, length: usize) -> Vec<u8> {
    random_sequence(&mut seeded_rng(seed), length, DNA)
}
