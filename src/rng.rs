// src/rng.rs
//
// Deterministic xorshift32 generator shared by everything that needs jitter.

/// Seed used when no explicit seed is configured.
pub const DEFAULT_SEED: u32 = 12345;

/// Simple xorshift random number generator.
///
/// - no allocation
/// - no reseeding during normal operation
/// - identical call sequences yield identical values
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        // xorshift has a fixed point at zero
        let state = if seed == 0 { DEFAULT_SEED } else { seed };
        Self { state }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform float in [0, 1).
    ///
    /// Only the top 24 bits are used so the result is exactly representable
    /// and can never round up to 1.0.
    #[inline]
    pub fn next_uniform(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 * (1.0 / 16_777_216.0)
    }

    /// Uniform float in [-1, 1).
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        self.next_uniform() * 2.0 - 1.0
    }
}

impl Default for XorShift32 {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_range() {
        let mut rng = XorShift32::default();
        for _ in 0..100_000 {
            let v = rng.next_uniform();
            assert!((0.0..1.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = XorShift32::new(777);
        let mut b = XorShift32::new(777);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_first_value_matches_xorshift32() {
        // 12345 -> 13 / 17 / 5 shift sequence
        let mut rng = XorShift32::new(12345);
        let mut x: u32 = 12345;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        assert_eq!(rng.next_u32(), x);
    }

    #[test]
    fn test_zero_seed_is_not_stuck() {
        let mut rng = XorShift32::new(0);
        assert_ne!(rng.next_u32(), 0);
    }
}
