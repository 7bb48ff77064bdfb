//! Injectable randomness
//!
//! Every synthetic value on the dashboard (insight labels, projections,
//! curves) is drawn through [`RandomSource`] so tests can swap the system
//! RNG for a [`FixedSequence`].

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform samples in `[0, 1)`
pub trait RandomSource: Send {
    fn unit(&mut self) -> f64;

    /// Uniform index in `0..len`, `len` must be non-zero
    fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

/// Operating-system seeded RNG
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible stream, handy for demos and property tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of samples, wrapping around at the end
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedSequence {
    /// Values are clamped into `[0, 1)`; an empty list behaves like `[0.0]`
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let mut values: Vec<f64> = values
            .into()
            .into_iter()
            .map(|value| value.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        if values.is_empty() {
            values.push(0.0);
        }
        Self { values, cursor: 0 }
    }

    /// Always yields the same sample
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for FixedSequence {
    fn unit(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sequence_wraps() {
        let mut seq = FixedSequence::new(vec![0.1, 0.2, 0.3]);
        let drawn: Vec<f64> = (0..5).map(|_| seq.unit()).collect();
        assert_eq!(drawn, vec![0.1, 0.2, 0.3, 0.1, 0.2]);
    }

    #[test]
    fn test_fixed_sequence_clamps_and_handles_empty() {
        let mut seq = FixedSequence::new(vec![1.5, -0.2]);
        assert!(seq.unit() < 1.0);
        assert_eq!(seq.unit(), 0.0);

        let mut empty = FixedSequence::new(Vec::new());
        assert_eq!(empty.unit(), 0.0);
    }

    #[test]
    fn test_index_stays_in_bounds() {
        let mut high = FixedSequence::constant(0.999_999);
        assert_eq!(high.index(8), 7);
        let mut low = FixedSequence::constant(0.0);
        assert_eq!(low.index(3), 0);
    }

    #[test]
    fn test_system_random_range() {
        let mut rng = SystemRandom::seeded(42);
        for _ in 0..1_000 {
            let value = rng.unit();
            assert!((0.0..1.0).contains(&value));
        }
    }
}
