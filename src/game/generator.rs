//! Sequence generation
//!
//! One uniformly random symbol is appended per round. The RNG is a seeded
//! `Pcg32` so a game is fully reproducible from its seed.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::Symbol;

/// Produces the next round's sequence by appending one random symbol.
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    rng: Pcg32,
    pad_count: u8,
}

impl SequenceGenerator {
    /// Create a generator over `pad_count` symbols, seeded for determinism.
    pub fn new(seed: u64, pad_count: u8) -> Self {
        debug_assert!(pad_count > 0);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            pad_count,
        }
    }

    /// Return `sequence` with exactly one symbol appended, drawn uniformly
    /// from the pad set. No side effects beyond RNG consumption.
    pub fn extend(&mut self, sequence: &[Symbol]) -> Vec<Symbol> {
        let mut next = Vec::with_capacity(sequence.len() + 1);
        next.extend_from_slice(sequence);
        next.push(Symbol(self.rng.random_range(0..self.pad_count)));
        next
    }
}
