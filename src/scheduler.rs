// src/scheduler.rs

use crate::modulation::{ModContext, ModTarget};

/// Shortest allowed interval between grain onsets, in seconds.
pub const MIN_GRAIN_INTERVAL: f32 = 0.005;

/// Longest allowed interval between grain onsets, in seconds.
pub const MAX_GRAIN_INTERVAL: f32 = 10.0;

/// Grain onset clock.
///
/// Tracks the absolute time of the next grain onset. Each block asks which
/// onsets fall inside `[block_start, block_end)`; the engine spawns one grain
/// per onset and the cursor advances by the (modulated) density interval.
///
/// Because the interval is clamped to at least `MIN_GRAIN_INTERVAL`, the
/// number of onsets per block is bounded by block duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrainScheduler {
    next_grain_time: f64,
}

impl GrainScheduler {
    pub fn new() -> Self {
        Self {
            next_grain_time: 0.0,
        }
    }

    /// Schedule the next onset at `time`.
    #[inline]
    pub fn reset(&mut self, time: f64) {
        self.next_grain_time = time;
    }

    /// Drop any onsets that fell behind `block_start` while no grains could
    /// be rendered, so they are not replayed as a burst.
    #[inline]
    pub fn catch_up(&mut self, block_start: f64) {
        if self.next_grain_time < block_start {
            self.next_grain_time = block_start;
        }
    }

    /// Whether an onset is due before `block_end`.
    #[inline]
    pub fn is_due(&self, block_end: f64) -> bool {
        self.next_grain_time < block_end
    }

    /// Advance past the onset just spawned.
    ///
    /// Returns the interval actually used.
    #[inline]
    pub fn advance(&mut self, density: f32, modulation: &ModContext) -> f32 {
        let interval = modulation
            .modulate(ModTarget::Density, density)
            .clamp(MIN_GRAIN_INTERVAL, MAX_GRAIN_INTERVAL);
        self.next_grain_time += interval as f64;
        interval
    }
}
