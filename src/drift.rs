// src/drift.rs
//
// Alternate spawn-center sources: a frozen fixed position and a drifting
// random walk around a base point.

use crate::rng::XorShift32;

/// Resolves where grains are centered, with precedence
/// frozen > drifting > manual.
#[derive(Debug, Clone, Copy)]
pub struct SpawnPosition {
    frozen: bool,
    frozen_position: f32,

    drifting: bool,
    drift_position: f32,
    drift_base: f32,
    drift_speed: f32,
    drift_return: f32,
}

impl SpawnPosition {
    pub fn new() -> Self {
        Self {
            frozen: false,
            frozen_position: 0.0,
            drifting: false,
            drift_position: 0.5,
            drift_base: 0.5,
            drift_speed: 0.5,
            drift_return: 0.3,
        }
    }

    /// Pin the spawn center. The position is kept only when freezing.
    pub fn set_frozen(&mut self, frozen: bool, position: f32) {
        self.frozen = frozen;
        if frozen {
            self.frozen_position = position;
        }
    }

    /// Enable or disable drift. Enabling restarts the walk at `base`.
    pub fn set_drift(&mut self, enabled: bool, base: f32, speed: f32, return_tendency: f32) {
        self.drifting = enabled;
        if enabled {
            self.drift_base = base;
            self.drift_position = base;
            self.drift_speed = speed;
            self.drift_return = return_tendency;
        }
    }

    /// Whether the drift walk should advance this block.
    #[inline]
    pub fn drift_active(&self) -> bool {
        self.drifting && !self.frozen
    }

    /// One random-walk step covering `dt` seconds, pulled back toward the
    /// base and clamped to 0..1.
    pub fn update_drift(&mut self, dt: f32, rng: &mut XorShift32) {
        let step_size = self.drift_speed * dt * 0.5;
        let random_step = rng.next_bipolar() * step_size;

        let return_force = (self.drift_base - self.drift_position) * self.drift_return * dt * 0.5;

        self.drift_position = (self.drift_position + random_step + return_force).clamp(0.0, 1.0);
    }

    /// Spawn center before modulation.
    #[inline]
    pub fn resolve(&self, manual: f32) -> f32 {
        if self.frozen {
            self.frozen_position
        } else if self.drifting {
            self.drift_position
        } else {
            manual
        }
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[inline]
    pub fn is_drifting(&self) -> bool {
        self.drifting
    }

    #[inline]
    pub fn drift_position(&self) -> f32 {
        self.drift_position
    }
}

impl Default for SpawnPosition {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let mut pos = SpawnPosition::new();
        assert_eq!(pos.resolve(0.2), 0.2);

        pos.set_drift(true, 0.7, 0.0, 0.0);
        assert_eq!(pos.resolve(0.2), 0.7);

        pos.set_frozen(true, 0.9);
        assert_eq!(pos.resolve(0.2), 0.9);
        assert!(!pos.drift_active());

        pos.set_frozen(false, 0.0);
        assert_eq!(pos.resolve(0.2), 0.7);
    }

    #[test]
    fn test_unfreeze_keeps_last_frozen_position() {
        let mut pos = SpawnPosition::new();
        pos.set_frozen(true, 0.4);
        pos.set_frozen(false, 0.9);
        pos.set_frozen(true, 0.4);
        assert_eq!(pos.resolve(0.0), 0.4);
    }

    #[test]
    fn test_drift_stays_in_range() {
        let mut rng = XorShift32::default();
        let mut pos = SpawnPosition::new();
        pos.set_drift(true, 0.99, 50.0, 0.0);
        for _ in 0..10_000 {
            pos.update_drift(0.01, &mut rng);
            let p = pos.drift_position();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_drift_returns_toward_base() {
        let mut rng = XorShift32::default();
        let mut pos = SpawnPosition::new();
        pos.set_drift(true, 0.5, 0.0, 1.0);
        // Push away from base, then let the pull act alone
        pos.drift_position = 1.0;
        for _ in 0..100 {
            pos.update_drift(0.1, &mut rng);
        }
        assert!(pos.drift_position() < 0.9);
        assert!(pos.drift_position() > 0.5);
    }

    #[test]
    fn test_zero_speed_zero_return_is_stationary() {
        let mut rng = XorShift32::default();
        let mut pos = SpawnPosition::new();
        pos.set_drift(true, 0.3, 0.0, 0.0);
        pos.update_drift(1.0, &mut rng);
        assert_eq!(pos.drift_position(), 0.3);
    }
}
