// src/grain.rs
//
// A single in-flight grain and the math that shapes it.

use std::f32::consts::FRAC_PI_4;

use crate::envelope::EnvelopeShape;
use crate::sample_buffer::SampleBuffer;

/// Slot index into the grain pool.
pub type GrainId = usize;

/// Playback rate for a pitch offset in semitones plus a detune in cents.
///
/// Equal-tempered: +12 semitones doubles the rate.
#[inline]
pub fn pitch_to_rate(semitones: f32, detune_cents: f32) -> f32 {
    let cents = semitones * 100.0 + detune_cents;
    2.0f32.powf(cents / 1200.0)
}

/// Equal-power pan coefficients `(left, right)` for a pan in -1..1.
///
/// `left² + right² == 1` across the whole range.
#[inline]
pub fn equal_power_pan(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

/// Everything resolved at spawn time that a grain needs to play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainSpawn {
    /// Start read position in samples
    pub start: f32,
    /// Signed samples advanced per output sample
    pub playback_rate: f32,
    pub total_samples: u32,
    pub envelope: EnvelopeShape,
    /// Final pan in -1..1
    pub pan: f32,
    /// Start position normalized to the buffer length
    pub norm_position: f32,
    /// Grain duration in seconds
    pub duration: f32,
}

/// One voice of the grain pool.
///
/// Plain data, reused in place. "Allocation" is flipping `active`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grain {
    pub(crate) active: bool,

    // Playback
    position: f32,
    playback_rate: f32,
    samples_remaining: u32,
    total_samples: u32,

    // Envelope
    env_phase: f32,
    env_increment: f32,
    envelope: EnvelopeShape,

    // Pre-computed equal-power coefficients
    pan_left: f32,
    pan_right: f32,

    // Visualization snapshot
    norm_position: f32,
    duration: f32,
    pan: f32,
}

impl Grain {
    /// (Re)start this slot with freshly resolved spawn data.
    pub fn activate(&mut self, spawn: &GrainSpawn) {
        let total = spawn.total_samples.max(1);
        let (pan_left, pan_right) = equal_power_pan(spawn.pan);

        *self = Self {
            active: true,
            position: spawn.start,
            playback_rate: spawn.playback_rate,
            samples_remaining: total,
            total_samples: total,
            env_phase: 0.0,
            env_increment: 1.0 / total as f32,
            envelope: spawn.envelope,
            pan_left,
            pan_right,
            norm_position: spawn.norm_position,
            duration: spawn.duration,
            pan: spawn.pan,
        };
    }

    #[inline]
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Produce one stereo sample and advance.
    ///
    /// The grain deactivates itself once its sample count runs out or its
    /// read position leaves the buffer.
    #[inline]
    pub fn render(&mut self, buffer: &SampleBuffer) -> (f32, f32) {
        let sample = buffer.read(self.position) * self.envelope.amplitude(self.env_phase);

        self.position += self.playback_rate;
        self.env_phase += self.env_increment;
        self.samples_remaining = self.samples_remaining.saturating_sub(1);

        if self.samples_remaining == 0
            || self.position < 0.0
            || self.position >= buffer.len() as f32
        {
            self.active = false;
        }

        (sample * self.pan_left, sample * self.pan_right)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    #[inline]
    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.playback_rate < 0.0
    }

    #[inline]
    pub fn samples_remaining(&self) -> u32 {
        self.samples_remaining
    }

    #[inline]
    pub fn total_samples(&self) -> u32 {
        self.total_samples
    }

    #[inline]
    pub fn envelope(&self) -> &EnvelopeShape {
        &self.envelope
    }

    #[inline]
    pub fn pan_coefficients(&self) -> (f32, f32) {
        (self.pan_left, self.pan_right)
    }

    #[inline]
    pub fn pan(&self) -> f32 {
        self.pan
    }

    #[inline]
    pub fn norm_position(&self) -> f32 {
        self.norm_position
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }
}
