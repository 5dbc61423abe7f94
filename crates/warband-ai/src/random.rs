//! Injected randomness.
//!
//! Almost every branch of monster behaviour is a dice roll. All rolls go
//! through [`RandomSource`] so that production uses a seeded generator and
//! tests replay a fixed sequence.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A source of uniform floats in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// `true` with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Uniform value in `[lo, hi)`.
    fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Uniform integer in `[lo, hi]` (inclusive). Returns `lo` if the range
    /// is empty.
    #[allow(clippy::cast_possible_truncation)] // floor of a value inside [lo, hi + 1)
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = f64::from(hi) - f64::from(lo) + 1.0;
        let offset = (self.next_f64() * span).floor();
        let value = (f64::from(lo) + offset) as i32;
        value.clamp(lo, hi)
    }

    /// Uniform index into a collection of `len` items, `None` if empty.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )] // collection lengths are far below 2^52; result is clamped below len
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let raw = (self.next_f64() * len as f64).floor();
        let idx = if raw <= 0.0 { 0 } else { raw as usize };
        Some(idx.min(len.saturating_sub(1)))
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`].
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    let mut remaining = items.len();
    while remaining > 1 {
        let Some(j) = rng.pick_index(remaining) else {
            return;
        };
        remaining = remaining.saturating_sub(1);
        items.swap(remaining, j);
    }
}

/// Pick a random element of a slice.
pub fn pick<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    rng.pick_index(items.len()).and_then(|i| items.get(i))
}

/// Production source backed by a seeded [`SmallRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    /// Seeded generator; equal seeds replay equal sequences.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of values, cycling when exhausted.
///
/// Values are clamped into `[0, 1)`. An empty list always yields `0.0`.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    position: usize,
}

impl FixedSequence {
    /// Replay `values` in order.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for FixedSequence {
    fn next_f64(&mut self) -> f64 {
        let idx = self.position.checked_rem(self.values.len()).unwrap_or(0);
        self.position = self.position.wrapping_add(1);
        self.values
            .get(idx)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0 - f64::EPSILON)
    }
}
