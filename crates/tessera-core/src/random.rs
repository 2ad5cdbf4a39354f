//! Injectable uniform random source for pattern synthesis.
//!
//! Every `rand` generator is a [`RandomSource`]. Tests can substitute a fixed
//! sequence (see [`crate::test_utils::SequenceSource`]) to pin down exact
//! shape positions and colors.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use rand::Rng;

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    /// Next sample, uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..n`, computed as `floor(u * n)`.
    ///
    /// Returns 0 when `n` is 0.
    fn below(&mut self, n: usize) -> usize {
        let idx = (self.next_unit() * n as f64).floor() as usize;
        idx.min(n.saturating_sub(1))
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}
