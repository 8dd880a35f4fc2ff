// src/envelope.rs
//
// Grain amplitude envelope.

/// Fixed anti-click fade-in, as a fraction of grain length.
const FADE_RATIO: f32 = 0.01;

/// Level reached at the end of the fade-in; the attack ramps up from here.
const FADE_LEVEL: f32 = 0.001;

const EPSILON: f32 = 1e-6;

/// Envelope curve for attack and release segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeCurve {
    #[default]
    Linear,
    /// Quadratic approximation of an exponential curve
    Exponential,
}

impl EnvelopeCurve {
    /// Decode a host-side curve flag (1 = exponential, anything else linear).
    #[inline]
    pub fn from_index(index: u32) -> Self {
        if index == 1 {
            EnvelopeCurve::Exponential
        } else {
            EnvelopeCurve::Linear
        }
    }
}

/// Per-grain envelope settings, captured at spawn time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    /// Fraction of the grain spent in fade-in + attack
    pub attack_ratio: f32,
    /// Fraction of the grain spent in release
    pub release_ratio: f32,
    pub curve: EnvelopeCurve,
}

impl EnvelopeShape {
    pub fn new(attack_ratio: f32, release_ratio: f32, curve: EnvelopeCurve) -> Self {
        Self {
            attack_ratio,
            release_ratio,
            curve,
        }
    }

    /// Amplitude at `phase` (0..1 progress through the grain).
    ///
    /// Segments: fade-in, attack, sustain, release. Pure function.
    #[inline]
    pub fn amplitude(&self, phase: f32) -> f32 {
        let exponential = self.curve == EnvelopeCurve::Exponential;
        let attack_end = self.attack_ratio;
        let release_start = 1.0 - self.release_ratio;

        if phase < FADE_RATIO {
            phase / FADE_RATIO * FADE_LEVEL
        } else if phase < attack_end {
            let attack_span = attack_end - FADE_RATIO;
            if attack_span < EPSILON {
                return FADE_LEVEL;
            }
            let t = (phase - FADE_RATIO) / attack_span;
            let shaped = if exponential { t * t } else { t };
            FADE_LEVEL + shaped * (1.0 - FADE_LEVEL)
        } else if phase < release_start {
            1.0
        } else {
            if self.release_ratio < EPSILON {
                return 0.0;
            }
            let t = ((phase - release_start) / self.release_ratio).clamp(0.0, 1.0);
            let remaining = 1.0 - t;
            if exponential {
                remaining * remaining
            } else {
                remaining
            }
        }
    }
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self::new(0.5, 0.5, EnvelopeCurve::Linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(attack: f32, release: f32) -> EnvelopeShape {
        EnvelopeShape::new(attack, release, EnvelopeCurve::Linear)
    }

    #[test]
    fn test_segments() {
        let env = linear(0.2, 0.3);
        assert_eq!(env.amplitude(0.0), 0.0);
        assert!((env.amplitude(0.005) - 0.0005).abs() < 1e-7);
        assert_eq!(env.amplitude(0.5), 1.0);
        assert!((env.amplitude(0.85) - 0.5).abs() < 1e-5);
        assert!(env.amplitude(1.0).abs() < 1e-6);
        // Past the end stays clamped at silence
        assert_eq!(env.amplitude(1.5), 0.0);
    }

    #[test]
    fn test_attack_reaches_full_level() {
        let env = linear(0.5, 0.1);
        let just_before = env.amplitude(0.4999);
        assert!(just_before > 0.99 && just_before < 1.0);
        assert_eq!(env.amplitude(0.5), 1.0);
    }

    #[test]
    fn test_fade_boundary_is_continuous() {
        for curve in [EnvelopeCurve::Linear, EnvelopeCurve::Exponential] {
            let env = EnvelopeShape::new(0.4, 0.4, curve);
            let below = env.amplitude(0.01 - 1e-6);
            let above = env.amplitude(0.01 + 1e-6);
            assert!((below - above).abs() <= 0.001);
        }
    }

    #[test]
    fn test_exponential_is_below_linear_in_ramps() {
        let lin = EnvelopeShape::new(0.5, 0.5, EnvelopeCurve::Linear);
        let exp = EnvelopeShape::new(0.5, 0.5, EnvelopeCurve::Exponential);
        assert!(exp.amplitude(0.25) < lin.amplitude(0.25));
        assert!(exp.amplitude(0.75) < lin.amplitude(0.75));
        assert!((exp.amplitude(0.75) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_spans() {
        // Attack barely past the fade: flat at the fade level
        let env = linear(0.01 + 1e-7, 0.5);
        assert_eq!(env.amplitude(0.01), 0.001);

        // No release: hard stop
        let env = linear(0.1, 0.0);
        assert_eq!(env.amplitude(0.99), 1.0);
        assert_eq!(env.amplitude(1.0), 0.0);
    }

    #[test]
    fn test_pure_function() {
        let env = EnvelopeShape::new(0.3, 0.6, EnvelopeCurve::Exponential);
        for i in 0..=100 {
            let phase = i as f32 / 100.0;
            assert_eq!(env.amplitude(phase), env.amplitude(phase));
        }
    }

    #[test]
    fn test_curve_index() {
        assert_eq!(EnvelopeCurve::from_index(1), EnvelopeCurve::Exponential);
        assert_eq!(EnvelopeCurve::from_index(0), EnvelopeCurve::Linear);
        assert_eq!(EnvelopeCurve::from_index(7), EnvelopeCurve::Linear);
    }
}
