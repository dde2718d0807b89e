//! # Seeded Shuffle
//!
//! Deterministic Fisher–Yates permutation driven by a linear congruential
//! generator with `m = 2^31`, `a = 1103515245`, `c = 12345`.
//!
//! The draw `j = floor(random() * (i + 1))` is computed in integer
//! arithmetic as `(state * (i + 1)) >> 31`, where `random() = state / 2^31`.
//! The same seed and the same input order always yield the same output.
//!
//! Seeds derived from whole-second timestamps give identical orderings to
//! every request served within the same second. This is casual
//! randomization, not an entropy source.

use crate::primitives::{LCG_INCREMENT, LCG_MODULUS, LCG_MULTIPLIER};

/// Linear congruential generator over `[0, 2^31)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Seed the generator. Only the low 31 bits of the seed are significant.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed % LCG_MODULUS,
        }
    }

    /// Advance and return the next state in `[0, 2^31)`.
    pub fn next_state(&mut self) -> u64 {
        self.state = (LCG_MULTIPLIER
            .wrapping_mul(self.state)
            .wrapping_add(LCG_INCREMENT))
            % LCG_MODULUS;
        self.state
    }

    /// Draw a uniform index in `[0, bound)`.
    ///
    /// `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        let scaled = u128::from(self.next_state()) * bound as u128;
        (scaled >> 31) as usize
    }
}

/// Permute `items` in place with the seeded Fisher–Yates shuffle.
pub fn shuffle_in_place<T>(items: &mut [T], seed: u64) {
    let mut rng = Lcg::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

/// Return a seeded permutation of `items`.
#[must_use]
pub fn shuffle<T>(mut items: Vec<T>, seed: u64) -> Vec<T> {
    shuffle_in_place(&mut items, seed);
    items
}

/// Whether and how a result sequence is shuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShuffleMode {
    /// Keep first-seen order.
    #[default]
    Off,
    /// Shuffle with the given seed.
    Seeded(u64),
}

impl ShuffleMode {
    /// Apply the mode to a sequence.
    #[must_use]
    pub fn apply<T>(self, items: Vec<T>) -> Vec<T> {
        match self {
            Self::Off => items,
            Self::Seeded(seed) => shuffle(items, seed),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
