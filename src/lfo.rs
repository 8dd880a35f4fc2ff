// src/lfo.rs
//
// Low frequency oscillator used as the single modulation source.

use std::f32::consts::PI;

/// LFO waveform types.
///
/// Discriminants match the wire index used by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoShape {
    #[default]
    Sine = 0,
    Triangle = 1,
    Square = 2,
    Sawtooth = 3,
}

impl LfoShape {
    /// Decode a host-side shape index.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(LfoShape::Sine),
            1 => Some(LfoShape::Triangle),
            2 => Some(LfoShape::Square),
            3 => Some(LfoShape::Sawtooth),
            _ => None,
        }
    }
}

/// Evaluate an LFO waveform at an absolute time.
///
/// Output range is -1.0 to 1.0. This is a pure function of its inputs, so it
/// can be sampled at any time without order dependence.
#[inline]
pub fn lfo_value(time_sec: f64, rate_hz: f32, shape: LfoShape) -> f32 {
    let mut phase = (time_sec * rate_hz as f64).rem_euclid(1.0) as f32;
    if phase >= 1.0 {
        phase = 0.0;
    }

    match shape {
        LfoShape::Sine => (phase * 2.0 * PI).sin(),
        LfoShape::Square => {
            if phase < 0.5 { 1.0 } else { -1.0 }
        }
        LfoShape::Sawtooth => 2.0 * phase - 1.0,
        LfoShape::Triangle => (4.0 * phase - 2.0).abs() - 1.0,
    }
}

/// Low Frequency Oscillator for modulation.
///
/// Holds only rate and shape. The phase is derived from engine time on
/// every evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Lfo {
    rate: f32,
    shape: LfoShape,
}

impl Lfo {
    pub fn new() -> Self {
        Self {
            rate: 1.0,
            shape: LfoShape::Sine,
        }
    }

    #[inline]
    pub fn set_rate(&mut self, hz: f32) {
        self.rate = hz;
    }

    #[inline]
    pub fn set_shape(&mut self, shape: LfoShape) {
        self.shape = shape;
    }

    #[inline]
    pub fn value(&self, time_sec: f64) -> f32 {
        lfo_value(time_sec, self.rate, self.shape)
    }
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_sine_quarter_points() {
        let rate = 2.0;
        let at = |t: f64| lfo_value(t, rate, LfoShape::Sine);
        assert!(at(0.0).abs() < EPS);
        assert!((at(0.25 / rate as f64) - 1.0).abs() < EPS);
        assert!(at(0.5 / rate as f64).abs() < EPS);
        assert!((at(0.75 / rate as f64) + 1.0).abs() < EPS);
    }

    #[test]
    fn test_square() {
        assert_eq!(lfo_value(0.1, 1.0, LfoShape::Square), 1.0);
        assert_eq!(lfo_value(0.6, 1.0, LfoShape::Square), -1.0);
    }

    #[test]
    fn test_sawtooth_and_triangle() {
        assert!((lfo_value(0.0, 1.0, LfoShape::Sawtooth) + 1.0).abs() < EPS);
        assert!(lfo_value(0.5, 1.0, LfoShape::Sawtooth).abs() < EPS);

        assert!((lfo_value(0.0, 1.0, LfoShape::Triangle) - 1.0).abs() < EPS);
        assert!(lfo_value(0.25, 1.0, LfoShape::Triangle).abs() < EPS);
        assert!((lfo_value(0.5, 1.0, LfoShape::Triangle) + 1.0).abs() < EPS);
    }

    #[test]
    fn test_negative_time_folds_into_range() {
        for shape in [
            LfoShape::Sine,
            LfoShape::Triangle,
            LfoShape::Square,
            LfoShape::Sawtooth,
        ] {
            for i in 0..200 {
                let v = lfo_value(-3.7 + i as f64 * 0.013, 3.3, shape);
                assert!((-1.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_order_independent() {
        let mut lfo = Lfo::new();
        lfo.set_rate(5.0);
        lfo.set_shape(LfoShape::Triangle);
        let a = lfo.value(1.234);
        let _ = lfo.value(9.0);
        assert_eq!(a, lfo.value(1.234));
    }

    #[test]
    fn test_shape_index() {
        assert_eq!(LfoShape::from_index(2), Some(LfoShape::Square));
        assert_eq!(LfoShape::from_index(3), Some(LfoShape::Sawtooth));
        assert_eq!(LfoShape::from_index(9), None);
    }
}
