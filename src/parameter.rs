// src/parameter.rs
//
// One-pole parameter smoothing.

/// Smoothing window used for every engine smoother.
pub const DEFAULT_SMOOTHING_MS: f32 = 10.0;

/// Exponential one-pole smoother toward a target value.
///
/// Prevents zipper noise when a parameter jumps between configuration
/// updates. `process` is called once per output sample.
#[derive(Debug, Clone, Copy)]
pub struct ParamSmoother {
    sample_rate: f32,
    coeff: f32,
    current: f32,
    target: f32,
}

impl ParamSmoother {
    pub fn new(sample_rate: f32, smooth_time_ms: f32) -> Self {
        let mut smoother = Self {
            sample_rate,
            coeff: 1.0,
            current: 0.0,
            target: 0.0,
        };
        smoother.set_smooth_time(smooth_time_ms);
        smoother
    }

    /// Re-initialize for a new sample rate, keeping the current value.
    pub fn prepare(&mut self, sample_rate: f32, smooth_time_ms: f32) {
        self.sample_rate = sample_rate;
        self.set_smooth_time(smooth_time_ms);
    }

    /// Set the time constant. A non-positive time disables smoothing.
    pub fn set_smooth_time(&mut self, ms: f32) {
        self.coeff = if self.sample_rate > 0.0 && ms > 0.0 {
            1.0 - (-1.0 / (self.sample_rate * ms * 0.001)).exp()
        } else {
            1.0
        };
    }

    /// Jump to a value without ramping.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    #[inline]
    pub fn set_target(&mut self, value: f32) {
        self.target = value;
    }

    /// Advance by one sample and return the new current value.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.current += (self.target - self.current) * self.coeff;
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn coefficient(&self) -> f32 {
        self.coeff
    }
}

impl Default for ParamSmoother {
    fn default() -> Self {
        Self::new(48_000.0, DEFAULT_SMOOTHING_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficient() {
        let s = ParamSmoother::new(48_000.0, 10.0);
        let expected = 1.0 - (-1.0f32 / 480.0).exp();
        assert!((s.coefficient() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_set_immediate_has_no_ramp() {
        let mut s = ParamSmoother::default();
        s.set_immediate(3.0);
        assert_eq!(s.current(), 3.0);
        assert_eq!(s.target(), 3.0);
        assert_eq!(s.process(), 3.0);
    }

    #[test]
    fn test_ramp_is_monotonic_and_converges() {
        let mut s = ParamSmoother::default();
        s.set_immediate(0.0);
        s.set_target(1.0);

        let mut last = 0.0;
        for _ in 0..480 {
            let v = s.process();
            assert!(v > last && v < 1.0);
            last = v;
        }
        // One time constant reaches ~63%
        assert!((last - 0.632).abs() < 0.01);

        for _ in 0..48_000 {
            s.process();
        }
        assert!((s.current() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_time_disables_smoothing() {
        let mut s = ParamSmoother::new(48_000.0, 0.0);
        s.set_target(0.5);
        assert_eq!(s.process(), 0.5);
    }
}
