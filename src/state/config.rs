// src/state/config.rs
//
// Construction-time engine configuration.

use crate::parameter::DEFAULT_SMOOTHING_MS;
use crate::rng::DEFAULT_SEED;

// Default audio configuration
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// Configuration for creating an engine.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz (e.g., 44100.0, 48000.0).
    pub sample_rate: f32,
    /// Smoothing window for continuous parameters, in milliseconds.
    pub smoothing_ms: f32,
    /// Seed for the grain jitter generator.
    pub seed: u32,
    /// Frames rendered per call on the internal-buffer path.
    pub block_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            smoothing_ms: DEFAULT_SMOOTHING_MS,
            seed: DEFAULT_SEED,
            block_size: DEFAULT_BLOCK_SIZE as u32,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_smoothing_ms(mut self, ms: f32) -> Self {
        self.smoothing_ms = ms;
        self
    }
}
