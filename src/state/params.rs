// src/state/params.rs
//
// The full configuration snapshot sent from the control side.
//
// Enumerated settings travel as raw integers so the struct can cross FFI and
// wasm boundaries unchanged; they are decoded once per update.

use log::warn;

use crate::envelope::EnvelopeCurve;
use crate::lfo::LfoShape;
use crate::modulation::ModTargets;

use super::param_info::{ParamId, engine_param_infos, param_info};

/// Parameter IDs for by-id access.
pub mod param_ids {
    use super::ParamId;

    // Grain
    pub const GRAIN_SIZE: ParamId = 0;
    pub const DENSITY: ParamId = 1;
    pub const SPREAD: ParamId = 2;
    pub const POSITION: ParamId = 3;
    pub const REVERSAL_CHANCE: ParamId = 4;

    // Stereo
    pub const PAN: ParamId = 5;
    pub const PAN_SPREAD: ParamId = 6;

    // Pitch & FM
    pub const PITCH: ParamId = 7;
    pub const DETUNE: ParamId = 8;
    pub const FM_FREQ: ParamId = 9;
    pub const FM_AMOUNT: ParamId = 10;

    // Envelope
    pub const ATTACK: ParamId = 11;
    pub const RELEASE: ParamId = 12;
    pub const ENVELOPE_CURVE: ParamId = 13;

    // LFO
    pub const LFO_RATE: ParamId = 14;
    pub const LFO_AMOUNT: ParamId = 15;
    pub const LFO_SHAPE: ParamId = 16;

    // Output
    pub const VOLUME: ParamId = 17;

    // Pass-through effect settings
    pub const FILTER_FREQ: ParamId = 18;
    pub const FILTER_RES: ParamId = 19;
    pub const DIST_AMOUNT: ParamId = 20;
    pub const DELAY_TIME: ParamId = 21;
    pub const DELAY_FEEDBACK: ParamId = 22;
    pub const DELAY_MIX: ParamId = 23;
    pub const REVERB_MIX: ParamId = 24;
    pub const REVERB_DECAY: ParamId = 25;

    pub const COUNT: usize = 26;
}

/// Complete engine configuration.
///
/// Replaced wholesale on every update and read-only while a block is
/// processed. Values outside their documented range are clamped where they
/// feed grain computation, never rejected.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    // Grain
    /// Seconds (0.01 - 0.5)
    pub grain_size: f32,
    /// Seconds between grain onsets (0.005 - 10)
    pub density: f32,
    /// Random start offset, in half-buffer units (0 - 2)
    pub spread: f32,
    /// Normalized playhead (0 - 1)
    pub position: f32,
    /// Probability of backward playback (0 - 1)
    pub grain_reversal_chance: f32,

    // Stereo
    pub pan: f32,
    pub pan_spread: f32,

    // Pitch & FM
    /// Semitones (-24 - 24)
    pub pitch: f32,
    /// Random detune range in cents (0 - 100)
    pub detune: f32,
    pub fm_freq: f32,
    pub fm_amount: f32,

    // Envelope
    /// Fraction of the grain (0.01 - 0.9)
    pub attack: f32,
    /// Fraction of the grain (0.01 - 0.9)
    pub release: f32,
    /// 0 = linear, 1 = exponential
    pub envelope_curve: u32,

    // LFO
    pub lfo_rate: f32,
    pub lfo_amount: f32,
    /// 0 = sine, 1 = triangle, 2 = square, 3 = sawtooth
    pub lfo_shape: u32,
    /// Bit i routes the LFO to `ModTarget` i
    pub lfo_target_mask: u32,

    /// Final gain, applied by the host
    pub volume: f32,

    // Carried for downstream effects, not used by grain synthesis
    pub filter_freq: f32,
    pub filter_res: f32,
    pub dist_amount: f32,
    pub delay_time: f32,
    pub delay_feedback: f32,
    pub delay_mix: f32,
    pub reverb_mix: f32,
    pub reverb_decay: f32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            grain_size: 0.3,
            density: 0.15,
            spread: 0.0,
            position: 0.0,
            grain_reversal_chance: 0.0,
            pan: 0.0,
            pan_spread: 0.0,
            pitch: 0.0,
            detune: 0.0,
            fm_freq: 0.0,
            fm_amount: 0.0,
            attack: 0.5,
            release: 0.5,
            envelope_curve: 0,
            lfo_rate: 1.0,
            lfo_amount: 0.0,
            lfo_shape: 0,
            lfo_target_mask: 0,
            volume: 0.8,
            filter_freq: 20000.0,
            filter_res: 0.0,
            dist_amount: 0.0,
            delay_time: 0.3,
            delay_feedback: 0.3,
            delay_mix: 0.0,
            reverb_mix: 0.0,
            reverb_decay: 2.0,
        }
    }
}

impl EngineParams {
    /// Decoded LFO shape. Unknown indices fall back to sine.
    pub fn lfo_shape(&self) -> LfoShape {
        LfoShape::from_index(self.lfo_shape).unwrap_or_else(|| {
            warn!("Unknown LFO shape {}, using sine", self.lfo_shape);
            LfoShape::Sine
        })
    }

    #[inline]
    pub fn envelope_curve(&self) -> EnvelopeCurve {
        EnvelopeCurve::from_index(self.envelope_curve)
    }

    #[inline]
    pub fn lfo_targets(&self) -> ModTargets {
        ModTargets::from_bits(self.lfo_target_mask)
    }

    /// Read a parameter by ID.
    pub fn get(&self, id: ParamId) -> Option<f32> {
        use param_ids::*;

        let value = match id {
            GRAIN_SIZE => self.grain_size,
            DENSITY => self.density,
            SPREAD => self.spread,
            POSITION => self.position,
            REVERSAL_CHANCE => self.grain_reversal_chance,
            PAN => self.pan,
            PAN_SPREAD => self.pan_spread,
            PITCH => self.pitch,
            DETUNE => self.detune,
            FM_FREQ => self.fm_freq,
            FM_AMOUNT => self.fm_amount,
            ATTACK => self.attack,
            RELEASE => self.release,
            ENVELOPE_CURVE => self.envelope_curve as f32,
            LFO_RATE => self.lfo_rate,
            LFO_AMOUNT => self.lfo_amount,
            LFO_SHAPE => self.lfo_shape as f32,
            VOLUME => self.volume,
            FILTER_FREQ => self.filter_freq,
            FILTER_RES => self.filter_res,
            DIST_AMOUNT => self.dist_amount,
            DELAY_TIME => self.delay_time,
            DELAY_FEEDBACK => self.delay_feedback,
            DELAY_MIX => self.delay_mix,
            REVERB_MIX => self.reverb_mix,
            REVERB_DECAY => self.reverb_decay,
            _ => return None,
        };
        Some(value)
    }

    /// Write a parameter by ID, clamped into its documented range.
    ///
    /// Returns `false` for an unknown ID.
    pub fn set(&mut self, id: ParamId, value: f32) -> bool {
        use param_ids::*;

        let Some(info) = param_info(id) else {
            return false;
        };
        let value = info.clamp(value);

        match id {
            GRAIN_SIZE => self.grain_size = value,
            DENSITY => self.density = value,
            SPREAD => self.spread = value,
            POSITION => self.position = value,
            REVERSAL_CHANCE => self.grain_reversal_chance = value,
            PAN => self.pan = value,
            PAN_SPREAD => self.pan_spread = value,
            PITCH => self.pitch = value,
            DETUNE => self.detune = value,
            FM_FREQ => self.fm_freq = value,
            FM_AMOUNT => self.fm_amount = value,
            ATTACK => self.attack = value,
            RELEASE => self.release = value,
            ENVELOPE_CURVE => self.envelope_curve = value.round() as u32,
            LFO_RATE => self.lfo_rate = value,
            LFO_AMOUNT => self.lfo_amount = value,
            LFO_SHAPE => self.lfo_shape = value.round() as u32,
            VOLUME => self.volume = value,
            FILTER_FREQ => self.filter_freq = value,
            FILTER_RES => self.filter_res = value,
            DIST_AMOUNT => self.dist_amount = value,
            DELAY_TIME => self.delay_time = value,
            DELAY_FEEDBACK => self.delay_feedback = value,
            DELAY_MIX => self.delay_mix = value,
            REVERB_MIX => self.reverb_mix = value,
            REVERB_DECAY => self.reverb_decay = value,
            _ => return false,
        }
        true
    }

    /// Copy with every parameter clamped into its documented range.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for info in engine_param_infos() {
            if let Some(value) = self.get(info.id) {
                out.set(info.id, value);
            }
        }
        out.lfo_target_mask = self.lfo_targets().bits();
        out
    }
}
