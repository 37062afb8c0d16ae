//! # Random Stream
//!
//! The single seeded source of randomness for a run.
//!
//! Every non-deterministic decision (BSP split axis and offset, room geometry, corridor
//! shape, door placement, spawn tiles, enemy kinds, hazard spread) is drawn from one
//! [`RandomStream`], in a fixed order. The stream is backed by ChaCha8, whose output does not
//! depend on the platform, so a seed reproduces a run bit for bit.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded pseudo-random stream.
///
/// Owned by the [`GameState`](crate::GameState); generators borrow it mutably for the
/// duration of a call and never create their own.
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: ChaCha8Rng,
    seed: u64,
    draws: u64,
}

impl RandomStream {
    /// Creates a stream from a seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::RandomStream;
    ///
    /// let mut a = RandomStream::new(7);
    /// let mut b = RandomStream::new(7);
    /// assert_eq!(a.below(100), b.below(100));
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// The seed this stream was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Draws a float in `[0, 1)`.
    pub fn float(&mut self) -> f32 {
        self.draws += 1;
        self.rng.gen::<f32>()
    }

    /// Draws an integer in `[0, n)`.
    ///
    /// Returns 0 without consuming a draw when `n` is 0. Sampling goes through `u64` so the
    /// stream does not depend on the width of `usize`.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.draws += 1;
        self.rng.gen_range(0..n as u64) as usize
    }

    /// Draws an integer in `[0, n)` for signed extents.
    ///
    /// Non-positive extents yield 0 without consuming a draw.
    pub fn below_i32(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.below(n as usize) as i32
    }

    /// Shuffles a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
