//! WebAssembly bindings via wasm-bindgen for browser integration.
//!
//! This module is only compiled when the `web` feature is enabled.
//!
//! # Usage
//!
//! Build with wasm-pack:
//! ```bash
//! wasm-pack build --target web --features web
//! ```
//!
//! # JavaScript Example
//!
//! ```javascript
//! import init, { granum_init, GranumEngine, WebParams } from './granum.js';
//!
//! const wasm = await init();
//! granum_init();
//!
//! const engine = new GranumEngine(sampleRate);
//!
//! // Write decoded audio straight into engine memory
//! const ptr = engine.allocate_sample_buffer(samples.length);
//! new Float32Array(wasm.memory.buffer, ptr, samples.length).set(samples);
//! engine.commit_sample_buffer(1, samples.length);
//!
//! const params = new WebParams();
//! params.density = 0.05;
//! engine.update_params(params);
//! engine.start();
//!
//! // In the AudioWorklet's process()
//! const frames = engine.process(128);
//! left.set(new Float32Array(wasm.memory.buffer, engine.output_left_ptr(), frames));
//! right.set(new Float32Array(wasm.memory.buffer, engine.output_right_ptr(), frames));
//! ```

use wasm_bindgen::prelude::*;

use crate::engine::GrainEngine;
use crate::state::{EngineConfig, EngineParams, EngineReadback, ParamId, engine_param_infos, param_info};

// ═══════════════════════════════════════════════════════════════════════════
// Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the wasm module. Call this once before using any other functions.
/// Sets up panic hooks and console logging.
#[wasm_bindgen]
pub fn granum_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

// ═══════════════════════════════════════════════════════════════════════════
// Parameters
// ═══════════════════════════════════════════════════════════════════════════

/// Engine configuration as a JS value object.
///
/// Mirrors `EngineParams` field for field; see that type for ranges.
#[wasm_bindgen]
#[derive(Clone, Copy)]
pub struct WebParams {
    pub grain_size: f32,
    pub density: f32,
    pub spread: f32,
    pub position: f32,
    pub grain_reversal_chance: f32,
    pub pan: f32,
    pub pan_spread: f32,
    pub pitch: f32,
    pub detune: f32,
    pub fm_freq: f32,
    pub fm_amount: f32,
    pub attack: f32,
    pub release: f32,
    pub envelope_curve: u32,
    pub lfo_rate: f32,
    pub lfo_amount: f32,
    pub lfo_shape: u32,
    pub lfo_target_mask: u32,
    pub volume: f32,
    pub filter_freq: f32,
    pub filter_res: f32,
    pub dist_amount: f32,
    pub delay_time: f32,
    pub delay_feedback: f32,
    pub delay_mix: f32,
    pub reverb_mix: f32,
    pub reverb_decay: f32,
}

#[wasm_bindgen]
impl WebParams {
    /// Create a parameter set with default values.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        EngineParams::default().into()
    }
}

impl Default for WebParams {
    fn default() -> Self {
        Self::new()
    }
}

impl From<EngineParams> for WebParams {
    fn from(p: EngineParams) -> Self {
        Self {
            grain_size: p.grain_size,
            density: p.density,
            spread: p.spread,
            position: p.position,
            grain_reversal_chance: p.grain_reversal_chance,
            pan: p.pan,
            pan_spread: p.pan_spread,
            pitch: p.pitch,
            detune: p.detune,
            fm_freq: p.fm_freq,
            fm_amount: p.fm_amount,
            attack: p.attack,
            release: p.release,
            envelope_curve: p.envelope_curve,
            lfo_rate: p.lfo_rate,
            lfo_amount: p.lfo_amount,
            lfo_shape: p.lfo_shape,
            lfo_target_mask: p.lfo_target_mask,
            volume: p.volume,
            filter_freq: p.filter_freq,
            filter_res: p.filter_res,
            dist_amount: p.dist_amount,
            delay_time: p.delay_time,
            delay_feedback: p.delay_feedback,
            delay_mix: p.delay_mix,
            reverb_mix: p.reverb_mix,
            reverb_decay: p.reverb_decay,
        }
    }
}

impl From<&WebParams> for EngineParams {
    fn from(p: &WebParams) -> Self {
        Self {
            grain_size: p.grain_size,
            density: p.density,
            spread: p.spread,
            position: p.position,
            grain_reversal_chance: p.grain_reversal_chance,
            pan: p.pan,
            pan_spread: p.pan_spread,
            pitch: p.pitch,
            detune: p.detune,
            fm_freq: p.fm_freq,
            fm_amount: p.fm_amount,
            attack: p.attack,
            release: p.release,
            envelope_curve: p.envelope_curve,
            lfo_rate: p.lfo_rate,
            lfo_amount: p.lfo_amount,
            lfo_shape: p.lfo_shape,
            lfo_target_mask: p.lfo_target_mask,
            volume: p.volume,
            filter_freq: p.filter_freq,
            filter_res: p.filter_res,
            dist_amount: p.dist_amount,
            delay_time: p.delay_time,
            delay_feedback: p.delay_feedback,
            delay_mix: p.delay_mix,
            reverb_mix: p.reverb_mix,
            reverb_decay: p.reverb_decay,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Readback Data
// ═══════════════════════════════════════════════════════════════════════════

/// Readback data from the engine (for UI meters/displays).
#[wasm_bindgen]
#[derive(Clone, Copy, Default)]
pub struct GranumReadback {
    /// Engine time in seconds.
    pub current_time: f64,
    /// Number of currently active grains.
    pub active_grains: u32,
    /// Grain events waiting to be read.
    pub pending_events: u32,
    /// Smoothed output gain.
    pub volume: f32,
    /// Whether playback is running.
    pub playing: bool,
}

impl From<EngineReadback> for GranumReadback {
    fn from(r: EngineReadback) -> Self {
        Self {
            current_time: r.current_time,
            active_grains: r.active_grains as u32,
            pending_events: r.pending_events as u32,
            volume: r.volume,
            playing: r.playing,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Engine (AudioWorklet-side handle)
// ═══════════════════════════════════════════════════════════════════════════

/// Grain engine for use inside an AudioWorklet.
///
/// The worklet owns the engine outright; control messages arriving over the
/// worklet port are applied between `process` calls.
#[wasm_bindgen]
pub struct GranumEngine {
    inner: GrainEngine,
}

#[wasm_bindgen]
impl GranumEngine {
    /// Create and initialize an engine at `sample_rate`.
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f32) -> GranumEngine {
        let mut inner = GrainEngine::with_config(EngineConfig::default().with_sample_rate(sample_rate));
        inner.init(sample_rate);
        GranumEngine { inner }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn init(&mut self, sample_rate: f32) {
        self.inner.init(sample_rate);
    }

    pub fn start(&mut self) {
        self.inner.start();
    }

    pub fn stop(&mut self) {
        self.inner.stop();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the configuration; continuous values ramp.
    pub fn update_params(&mut self, params: &WebParams) {
        self.inner.update_params(&params.into());
    }

    /// Replace the configuration without ramping.
    pub fn update_params_immediate(&mut self, params: &WebParams) {
        self.inner.update_params_immediate(&params.into());
    }

    /// Set one parameter by ID. Returns false for an unknown ID.
    pub fn set_param(&mut self, id: ParamId, value: f32) -> bool {
        let mut params = *self.inner.params();
        if !params.set(id, value) {
            return false;
        }
        self.inner.update_params(&params);
        true
    }

    /// Current configuration.
    pub fn get_params(&self) -> WebParams {
        (*self.inner.params()).into()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sample buffer
    // ─────────────────────────────────────────────────────────────────────────

    /// Allocate `len` samples of engine memory and return a pointer into the
    /// wasm heap. Fill it, then call `commit_sample_buffer`.
    pub fn allocate_sample_buffer(&mut self, len: usize) -> *mut f32 {
        self.inner.allocate_buffer(len).as_mut_ptr()
    }

    /// Mark the allocated buffer as valid.
    pub fn commit_sample_buffer(&mut self, channels: u32, len: usize) {
        self.inner.commit_buffer(channels as usize, len);
    }

    pub fn buffer_length(&self) -> usize {
        self.inner.buffer_len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Processing
    // ─────────────────────────────────────────────────────────────────────────

    /// Render up to one block into the engine's output buffers.
    ///
    /// Returns the number of frames rendered.
    pub fn process(&mut self, frames: usize) -> usize {
        self.inner.process_internal(frames)
    }

    pub fn output_left_ptr(&mut self) -> *mut f32 {
        self.inner.output_left_ptr()
    }

    pub fn output_right_ptr(&mut self) -> *mut f32 {
        self.inner.output_right_ptr()
    }

    /// Maximum frames per `process` call.
    pub fn block_size(&self) -> usize {
        self.inner.output_left().len()
    }

    /// Gain to apply after the engine output.
    pub fn smoothed_volume(&self) -> f32 {
        self.inner.smoothed_volume()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Freeze / Drift
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_frozen(&mut self, frozen: bool, position: f32) {
        self.inner.set_frozen(frozen, position);
    }

    pub fn set_drift(&mut self, enabled: bool, base_position: f32, speed: f32, return_tendency: f32) {
        self.inner
            .set_drift(enabled, base_position, speed, return_tendency);
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.is_frozen()
    }

    pub fn is_drifting(&self) -> bool {
        self.inner.is_drifting()
    }

    pub fn drift_position(&self) -> f32 {
        self.inner.drift_position()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grain events
    // ─────────────────────────────────────────────────────────────────────────

    pub fn grain_event_count(&self) -> u32 {
        self.inner.event_count() as u32
    }

    pub fn grain_event_position(&self, index: u32) -> f32 {
        self.inner.event_norm_position(index as usize)
    }

    pub fn grain_event_duration(&self, index: u32) -> f32 {
        self.inner.event_duration(index as usize)
    }

    pub fn grain_event_pan(&self, index: u32) -> f32 {
        self.inner.event_pan(index as usize)
    }

    pub fn clear_grain_events(&mut self) {
        self.inner.clear_events();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Readback
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_readback(&self) -> GranumReadback {
        self.inner.readback().into()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    pub fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    pub fn active_grain_count(&self) -> u32 {
        self.inner.active_grain_count() as u32
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parameter Metadata
// ═══════════════════════════════════════════════════════════════════════════

/// Number of parameters addressable by ID.
#[wasm_bindgen]
pub fn param_count() -> u32 {
    engine_param_infos().len() as u32
}

/// Display name for a parameter, or an empty string for an unknown ID.
#[wasm_bindgen]
pub fn param_name(id: ParamId) -> String {
    param_info(id).map(|i| i.name.to_string()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn param_min(id: ParamId) -> f32 {
    param_info(id).map_or(0.0, |i| i.min)
}

#[wasm_bindgen]
pub fn param_max(id: ParamId) -> f32 {
    param_info(id).map_or(0.0, |i| i.max)
}

#[wasm_bindgen]
pub fn param_default(id: ParamId) -> f32 {
    param_info(id).map_or(0.0, |i| i.default)
}

/// Format a value for display with its unit.
#[wasm_bindgen]
pub fn param_format(id: ParamId, value: f32) -> String {
    param_info(id).map(|i| i.format(value)).unwrap_or_default()
}
