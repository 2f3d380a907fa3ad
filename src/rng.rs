//! Tiny per-thread RNG for scheduling decisions (victim selection, target
//! deque choice).
//!
//! ## Design Choices
//!
//! **Generator**: a 64-bit linear congruential step (Knuth's MMIX constants)
//! with an xor-fold of the high bits onto the output. An LCG's low bits are
//! weak on their own; the fold makes every output bit depend on the strong
//! high half. That is all the quality a "pick one of N workers" draw needs.
//!
//! **Bounded sampling**: fixed-point scaling of the full 64-bit output onto
//! `[0, upper)` with one widening multiply. The mapping is biased by at most
//! `upper / 2^64`, which is irrelevant for worker counts; in exchange there
//! is no rejection loop and no division.
//!
//! **Seeding**: each worker and each submitting thread owns its own instance
//! seeded from process entropy at first use. There is no shared RNG state, so
//! victim selection never touches a hot lock.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

// Knuth MMIX linear congruential constants.
const LCG_MUL: u64 = 6364136223846793005;
const LCG_ADD: u64 = 1442695040888963407;

/// Scheduling RNG.
///
/// NOT thread-safe; each thread owns its own instance. Intentionally does not
/// implement `Copy` so a stream cannot be duplicated by accident.
#[derive(Clone, Debug)]
pub struct SchedRng {
    state: u64,
}

impl SchedRng {
    /// Create a new RNG with the given seed.
    ///
    /// The state is stepped once immediately so that nearby seeds (worker
    /// ids, timestamps) do not produce nearly identical first draws.
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: seed };
        rng.step();
        rng
    }

    /// Create a new RNG seeded from a high-entropy source.
    ///
    /// `RandomState` draws fresh per-instance keys from the OS.
    pub fn from_entropy() -> Self {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(0x5EED);
        Self::new(hasher.finish())
    }

    #[inline]
    fn step(&mut self) {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
    }

    /// Next value in the sequence.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.step();
        self.state ^ (self.state >> 32)
    }

    /// Uniform-enough usize in `[0, upper)`.
    ///
    /// # Panics
    /// Panics in debug builds if `upper` is 0.
    #[inline]
    pub fn next_below(&mut self, upper: usize) -> usize {
        debug_assert!(upper > 0, "upper must be nonzero");
        (((self.next_u64() as u128) * (upper as u128)) >> 64) as usize
    }
}
