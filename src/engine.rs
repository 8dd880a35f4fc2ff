// src/engine.rs

use log::{debug, info, warn};

use crate::drift::SpawnPosition;
use crate::envelope::{EnvelopeCurve, EnvelopeShape};
use crate::event::{GrainEvent, GrainEventLog};
use crate::grain::{Grain, GrainSpawn, pitch_to_rate};
use crate::grain_pool::GrainPool;
use crate::lfo::Lfo;
use crate::modulation::{ModContext, ModTarget};
use crate::parameter::ParamSmoother;
use crate::rng::XorShift32;
use crate::sample_buffer::SampleBuffer;
use crate::scheduler::GrainScheduler;
use crate::state::{EngineConfig, EngineParams, EngineReadback};

/// Floor on playback-rate magnitude after FM.
const MIN_PLAYBACK_RATE: f32 = 0.1;

/// Initial smoother values after `init`.
const INITIAL_GRAIN_SIZE: f32 = 0.1;
const INITIAL_VOLUME: f32 = 0.8;

/// The five smoothed continuous parameters.
#[derive(Debug, Clone, Copy)]
struct Smoothers {
    pitch: ParamSmoother,
    position: ParamSmoother,
    grain_size: ParamSmoother,
    pan: ParamSmoother,
    volume: ParamSmoother,
}

impl Smoothers {
    fn new(sample_rate: f32, smoothing_ms: f32) -> Self {
        let s = ParamSmoother::new(sample_rate, smoothing_ms);
        let mut smoothers = Self {
            pitch: s,
            position: s,
            grain_size: s,
            pan: s,
            volume: s,
        };
        smoothers.reset();
        smoothers
    }

    fn reset(&mut self) {
        self.pitch.set_immediate(0.0);
        self.position.set_immediate(0.0);
        self.grain_size.set_immediate(INITIAL_GRAIN_SIZE);
        self.pan.set_immediate(0.0);
        self.volume.set_immediate(INITIAL_VOLUME);
    }

    fn set_targets(&mut self, params: &EngineParams) {
        self.pitch.set_target(params.pitch);
        self.position.set_target(params.position);
        self.grain_size.set_target(params.grain_size);
        self.pan.set_target(params.pan);
        self.volume.set_target(params.volume);
    }

    fn snap(&mut self, params: &EngineParams) {
        self.pitch.set_immediate(params.pitch);
        self.position.set_immediate(params.position);
        self.grain_size.set_immediate(params.grain_size);
        self.pan.set_immediate(params.pan);
        self.volume.set_immediate(params.volume);
    }

    #[inline]
    fn step(&mut self, frames: usize) {
        for _ in 0..frames {
            self.pitch.process();
            self.position.process();
            self.grain_size.process();
            self.pan.process();
            self.volume.process();
        }
    }
}

/// Settings for downstream effects, with LFO modulation applied.
///
/// The engine does not process these; it only routes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    pub filter_freq: f32,
    pub filter_res: f32,
    pub dist_amount: f32,
    pub delay_time: f32,
    pub delay_feedback: f32,
    pub delay_mix: f32,
    pub reverb_mix: f32,
    pub reverb_decay: f32,
}

/// Real-time granular engine.
///
/// `process` runs on the audio thread. It must be deterministic,
/// allocation-free and lock-free. Everything else is a control-side call
/// that is applied between blocks.
pub struct GrainEngine {
    config: EngineConfig,
    sample_rate: f32,
    inv_sample_rate: f32,

    playing: bool,
    /// Engine time in seconds
    current_time: f64,

    buffer: SampleBuffer,
    pool: GrainPool,
    scheduler: GrainScheduler,
    events: GrainEventLog,

    params: EngineParams,
    envelope_curve: EnvelopeCurve,
    lfo: Lfo,
    /// LFO sample and routing, cached per block
    modulation: ModContext,
    smoothers: Smoothers,
    spawn_position: SpawnPosition,
    rng: XorShift32,

    // Pre-allocated output for hosts rendering into engine memory
    output_left: Vec<f32>,
    output_right: Vec<f32>,
}

impl GrainEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let params = EngineParams::default();
        let block_size = config.block_size.max(1) as usize;

        let mut engine = Self {
            config,
            sample_rate: config.sample_rate,
            inv_sample_rate: 1.0 / config.sample_rate,
            playing: false,
            current_time: 0.0,
            buffer: SampleBuffer::new(),
            pool: GrainPool::new(),
            scheduler: GrainScheduler::new(),
            events: GrainEventLog::new(),
            params,
            envelope_curve: params.envelope_curve(),
            lfo: Lfo::new(),
            modulation: ModContext::default(),
            smoothers: Smoothers::new(config.sample_rate, config.smoothing_ms),
            spawn_position: SpawnPosition::new(),
            rng: XorShift32::new(config.seed),
            output_left: vec![0.0; block_size],
            output_right: vec![0.0; block_size],
        };
        engine.apply_params(&params);
        engine
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════

    /// Reset scheduling, smoothing, randomness and grain state for a new
    /// sample rate. The loaded buffer and configuration are kept.
    pub fn init(&mut self, sample_rate: f32) {
        info!("Initializing grain engine at {} Hz", sample_rate);

        self.sample_rate = sample_rate;
        self.inv_sample_rate = 1.0 / sample_rate;
        self.current_time = 0.0;
        self.scheduler.reset(0.0);
        self.pool.deactivate_all();
        self.events.clear();
        self.rng = XorShift32::new(self.config.seed);

        self.smoothers = Smoothers::new(sample_rate, self.config.smoothing_ms);
        self.smoothers.set_targets(&self.params);
    }

    pub fn start(&mut self) {
        if self.playing {
            return;
        }
        debug!("Start at {:.3}s", self.current_time);
        self.playing = true;
        self.scheduler.reset(self.current_time);
    }

    /// Stop playback. Every grain is cut immediately, without a fade.
    pub fn stop(&mut self) {
        debug!("Stop at {:.3}s", self.current_time);
        self.playing = false;
        self.pool.deactivate_all();
    }

    // ═══════════════════════════════════════════════════════════════════
    // Source buffer
    // ═══════════════════════════════════════════════════════════════════

    /// First step of a buffer load: returns a zeroed region to write into.
    ///
    /// The previous buffer is released and running grains are cut. The
    /// engine stays silent until [`Self::commit_buffer`].
    pub fn allocate_buffer(&mut self, len: usize) -> &mut [f32] {
        debug!("Allocating sample buffer of {} samples", len);
        self.pool.deactivate_all();
        self.buffer.allocate(len)
    }

    /// Second step of a buffer load: mark `len` samples as valid.
    ///
    /// Invalid input is clamped to the allocation and logged.
    pub fn commit_buffer(&mut self, channels: usize, len: usize) {
        match self.buffer.commit(channels, len) {
            Ok(()) => debug!("Committed sample buffer: {} samples, {} ch", len, channels),
            Err(e) => {
                warn!("{}; clamping", e);
                let len = len.min(self.buffer.allocated_len());
                let clamped = self.buffer.commit(channels.max(1), len);
                debug_assert!(clamped.is_ok());
            }
        }
    }

    /// Swap in a complete buffer, returning the previous storage so the
    /// caller can free it off the audio thread.
    pub fn replace_buffer(&mut self, samples: Vec<f32>, channels: usize) -> Vec<f32> {
        self.pool.deactivate_all();
        self.buffer.replace(samples, channels)
    }

    /// Writable view of the current allocation.
    pub fn buffer_data_mut(&mut self) -> &mut [f32] {
        self.buffer.data_mut()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════════════

    /// Replace the whole configuration. Continuous parameters ramp toward
    /// the new values.
    pub fn update_params(&mut self, params: &EngineParams) {
        self.apply_params(params);
    }

    /// Replace the whole configuration without ramping.
    pub fn update_params_immediate(&mut self, params: &EngineParams) {
        self.apply_params(params);
        self.smoothers.snap(params);
    }

    fn apply_params(&mut self, params: &EngineParams) {
        self.params = *params;
        self.envelope_curve = params.envelope_curve();
        self.lfo.set_rate(params.lfo_rate);
        self.lfo.set_shape(params.lfo_shape());
        self.modulation.targets = params.lfo_targets();
        self.modulation.depth = params.lfo_amount;
        self.smoothers.set_targets(params);
    }

    pub fn set_frozen(&mut self, frozen: bool, position: f32) {
        debug!("Freeze: {} at {}", frozen, position);
        self.spawn_position.set_frozen(frozen, position);
    }

    pub fn set_drift(&mut self, enabled: bool, base_position: f32, speed: f32, return_tendency: f32) {
        debug!(
            "Drift: {} (base {}, speed {}, return {})",
            enabled, base_position, speed, return_tendency
        );
        self.spawn_position
            .set_drift(enabled, base_position, speed, return_tendency);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Processing
    // ═══════════════════════════════════════════════════════════════════

    /// Render one block into `out_left`/`out_right`.
    ///
    /// Called once per audio block from the audio callback.
    /// It must not allocate or block.
    pub fn process(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
        let frames = out_left.len().min(out_right.len());
        out_left.fill(0.0);
        out_right.fill(0.0);

        let block_duration = frames as f64 / self.sample_rate as f64;

        if !self.playing || !self.buffer.is_loaded() {
            self.current_time += block_duration;
            return;
        }

        // LFO rates are low enough to sample once per block
        self.modulation.lfo_value = self.lfo.value(self.current_time);

        // Spawns below read the post-block smoother state
        self.smoothers.step(frames);

        if self.spawn_position.drift_active() {
            self.spawn_position
                .update_drift(frames as f32 * self.inv_sample_rate, &mut self.rng);
        }

        let block_end = self.current_time + block_duration;
        self.scheduler.catch_up(self.current_time);
        while self.scheduler.is_due(block_end) {
            self.spawn_grain();
            self.scheduler.advance(self.params.density, &self.modulation);
        }

        self.pool
            .render(&self.buffer, out_left, out_right, frames);

        self.current_time = block_end;
    }

    /// Render up to one internal block into the engine-owned output buffers.
    ///
    /// Returns the number of frames rendered.
    pub fn process_internal(&mut self, frames: usize) -> usize {
        let frames = frames.min(self.output_left.len());

        // Taking the vectors leaves empty, non-allocating placeholders
        let mut left = std::mem::take(&mut self.output_left);
        let mut right = std::mem::take(&mut self.output_right);
        self.process(&mut left[..frames], &mut right[..frames]);
        self.output_left = left;
        self.output_right = right;

        frames
    }

    fn spawn_grain(&mut self) {
        let spawn = self.resolve_spawn();
        self.pool.spawn(&spawn);
        self.events.push(GrainEvent {
            norm_position: spawn.norm_position,
            duration: spawn.duration,
            pan: spawn.pan,
        });
    }

    /// Resolve everything a new grain needs from the current configuration,
    /// smoother state, modulation and randomness.
    fn resolve_spawn(&mut self) -> GrainSpawn {
        let m = self.modulation;

        let grain_size = m.resolve(ModTarget::GrainSize, self.smoothers.grain_size.current());
        let spread = m.resolve(ModTarget::Spread, self.params.spread);
        let pitch = m.resolve(ModTarget::Pitch, self.smoothers.pitch.current());
        let fm_freq = m.resolve(ModTarget::FmFreq, self.params.fm_freq);
        let fm_amount = m.resolve(ModTarget::FmAmount, self.params.fm_amount);
        let attack = m.resolve(ModTarget::Attack, self.params.attack);
        let release = m.resolve(ModTarget::Release, self.params.release);
        let pan_center = m.resolve(ModTarget::Pan, self.smoothers.pan.current());
        let pan_spread = m.resolve(ModTarget::PanSpread, self.params.pan_spread);

        let base_position = self
            .spawn_position
            .resolve(self.smoothers.position.current());
        let position = m.resolve(ModTarget::Position, base_position);

        let total_samples = ((grain_size * self.sample_rate).round() as u32).max(1);

        // Pitch + detune
        let detune = self.params.detune.clamp(0.0, 100.0);
        let detune_cents = self.rng.next_uniform() * detune * 2.0 - detune;
        let mut rate = pitch_to_rate(pitch, detune_cents);

        let reversed = self.rng.next_uniform() < self.params.grain_reversal_chance;

        // FM reads engine time, so grains spawned together share the offset
        if fm_amount > 0.0 {
            rate += (self.current_time as f32 * fm_freq).sin() * (fm_amount * 0.01);
        }
        let magnitude = rate.abs().max(MIN_PLAYBACK_RATE);
        let playback_rate = if reversed { -magnitude } else { magnitude };

        // Start position, keeping the whole traversal inside the buffer
        let len = self.buffer.len() as f32;
        let center = position * len;
        let offset = self.rng.next_bipolar() * spread * len * 0.5;
        let max_start = (len - total_samples as f32 * magnitude).max(0.0);
        let mut start = (center + offset).clamp(0.0, max_start);
        if reversed {
            start = (start + total_samples as f32).min(len - 1.0);
        }

        let random_pan = self.rng.next_bipolar() * pan_spread;
        let pan = (pan_center + random_pan).clamp(-1.0, 1.0);

        GrainSpawn {
            start,
            playback_rate,
            total_samples,
            envelope: EnvelopeShape::new(attack, release, self.envelope_curve),
            pan,
            norm_position: if len > 0.0 { start / len } else { 0.0 },
            duration: grain_size,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Grain events
    // ═══════════════════════════════════════════════════════════════════

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn event_norm_position(&self, index: usize) -> f32 {
        self.events.get(index).map_or(0.0, |e| e.norm_position)
    }

    pub fn event_duration(&self, index: usize) -> f32 {
        self.events.get(index).map_or(0.0, |e| e.duration)
    }

    pub fn event_pan(&self, index: usize) -> f32 {
        self.events.get(index).map_or(0.0, |e| e.pan)
    }

    pub fn events(&self) -> &[GrainEvent] {
        self.events.as_slice()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ═══════════════════════════════════════════════════════════════════
    // Readback
    // ═══════════════════════════════════════════════════════════════════

    /// Downstream effect settings with the current block's modulation.
    pub fn effect_params(&self) -> EffectParams {
        let m = &self.modulation;
        let p = &self.params;
        EffectParams {
            filter_freq: m.modulate(ModTarget::FilterFreq, p.filter_freq),
            filter_res: m.modulate(ModTarget::FilterRes, p.filter_res),
            dist_amount: m.modulate(ModTarget::DistAmount, p.dist_amount),
            delay_time: m.modulate(ModTarget::DelayTime, p.delay_time),
            delay_feedback: m.modulate(ModTarget::DelayFeedback, p.delay_feedback),
            delay_mix: m.modulate(ModTarget::DelayMix, p.delay_mix),
            reverb_mix: p.reverb_mix,
            reverb_decay: p.reverb_decay,
        }
    }

    pub fn readback(&self) -> EngineReadback {
        EngineReadback {
            current_time: self.current_time,
            active_grains: self.pool.active_count(),
            pending_events: self.events.len(),
            volume: self.smoothed_volume(),
            playing: self.playing,
        }
    }

    /// Final gain for the host to apply; the engine output is not scaled.
    pub fn smoothed_volume(&self) -> f32 {
        self.smoothers.volume.current()
    }

    pub fn grains(&self) -> impl Iterator<Item = &Grain> + '_ {
        self.pool.active_grains()
    }

    pub fn active_grain_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn output_left(&self) -> &[f32] {
        &self.output_left
    }

    pub fn output_right(&self) -> &[f32] {
        &self.output_right
    }

    pub fn output_left_ptr(&mut self) -> *mut f32 {
        self.output_left.as_mut_ptr()
    }

    pub fn output_right_ptr(&mut self) -> *mut f32 {
        self.output_right.as_mut_ptr()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_frozen(&self) -> bool {
        self.spawn_position.is_frozen()
    }

    pub fn is_drifting(&self) -> bool {
        self.spawn_position.is_drifting()
    }

    pub fn drift_position(&self) -> f32 {
        self.spawn_position.drift_position()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer_channels(&self) -> usize {
        self.buffer.channels()
    }
}

impl Default for GrainEngine {
    fn default() -> Self {
        Self::new()
    }
}
