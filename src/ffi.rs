// C-compatible FFI bindings for Swift/iOS integration.
//
// Safety requirements:
// - Handles must be created by this module and not fabricated
// - Pointer arguments may be NULL; NULL handles are ignored and NULL output
//   buffers are skipped
// - Caller must call the corresponding _destroy function for each handle

use crate::bridge::{ControlHandle, EngineHandle, create_bridge};
use crate::engine::GrainEngine;
use crate::event::GrainEvent;
use crate::state::{EngineConfig, EngineParams, EngineReadback, ParamId, engine_param_infos, param_ids, param_info};

use log::{LevelFilter, info, warn};
use oslog::OsLogger;

// Logger subsystem identifier
const LOG_SUBSYSTEM: &str = "com.granum.engine";

// ═══════════════════════════════════════════════════════════════════════════
// Logger Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the oslog logger.
///
/// Call once at application startup. Log output appears in Console.app and
/// Xcode's debug console.
#[unsafe(no_mangle)]
pub extern "C" fn granum_init_logger() {
    OsLogger::new(LOG_SUBSYSTEM)
        .level_filter(LevelFilter::Debug)
        .init()
        .ok();
}

// ═══════════════════════════════════════════════════════════════════════════
// Opaque Handle Types
// ═══════════════════════════════════════════════════════════════════════════

/// Opaque handle to the ControlHandle (UI-side).
pub struct GranumControl {
    inner: ControlHandle,
}

/// Opaque handle to the EngineHandle (audio-side).
pub struct GranumEngine {
    inner: EngineHandle,
}

// ═══════════════════════════════════════════════════════════════════════════
// FFI Result Types
// ═══════════════════════════════════════════════════════════════════════════

/// Readback data from the engine (for UI meters/displays).
#[repr(C)]
pub struct GranumReadback {
    pub current_time: f64,
    pub active_grains: u32,
    pub pending_events: u32,
    pub volume: f32,
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

/// Parameter range for UI controls.
#[repr(C)]
pub struct GranumParamInfo {
    pub id: u32,
    pub min_value: f32,
    pub max_value: f32,
    pub default_value: f32,
    /// 0 for continuous parameters
    pub step: f32,
}

// ═══════════════════════════════════════════════════════════════════════════
// Creation
// ═══════════════════════════════════════════════════════════════════════════

/// Get the default configuration values.
#[unsafe(no_mangle)]
pub extern "C" fn granum_default_config() -> EngineConfig {
    EngineConfig::default()
}

/// Get the default parameter snapshot.
#[unsafe(no_mangle)]
pub extern "C" fn granum_default_params() -> EngineParams {
    EngineParams::default()
}

/// Create a control/engine handle pair with default configuration.
///
/// # Safety
/// `out_engine` must be a valid pointer to store the engine handle, or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn granum_create(out_engine: *mut *mut GranumEngine) -> *mut GranumControl {
    let config = EngineConfig::default();
    unsafe { granum_create_with_config(&config, out_engine) }
}

/// Create a control/engine handle pair.
///
/// Returns the control handle; the engine handle is returned via
/// `out_engine`. Both must be destroyed with their destroy functions.
///
/// # Safety
/// - `config` must point to a valid `EngineConfig`, or be NULL for defaults
/// - `out_engine` must be a valid pointer to store the engine handle, or NULL
#[unsafe(no_mangle)]
pub unsafe extern "C" fn granum_create_with_config(
    config: *const EngineConfig,
    out_engine: *mut *mut GranumEngine,
) -> *mut GranumControl {
    let cfg = if config.is_null() {
        EngineConfig::default()
    } else {
        unsafe { std::ptr::read(config) }
    };
    info!(
        "Creating engine: {} Hz, block {}, seed {}",
        cfg.sample_rate, cfg.block_size, cfg.seed
    );

    let mut engine = GrainEngine::with_config(cfg);
    engine.init(cfg.sample_rate);
    let (control, engine_handle) = create_bridge(engine);

    if !out_engine.is_null() {
        unsafe {
            *out_engine = Box::into_raw(Box::new(GranumEngine {
                inner: engine_handle,
            }));
        }
    } else {
        warn!("granum_create called without an engine out-pointer");
    }

    Box::into_raw(Box::new(GranumControl { inner: control }))
}

/// Destroy a control handle.
///
/// # Safety
/// `control` must be a valid pointer returned by `granum_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_destroy(control: *mut GranumControl) {
    if !control.is_null() {
        unsafe { drop(Box::from_raw(control)) };
    }
}

/// Destroy an engine handle.
///
/// # Safety
/// `engine` must be a valid pointer returned via `granum_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_destroy(engine: *mut GranumEngine) {
    if !engine.is_null() {
        unsafe { drop(Box::from_raw(engine)) };
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Parameters
// ═══════════════════════════════════════════════════════════════════════════

/// Replace the engine configuration; continuous values ramp.
///
/// # Safety
/// `params` must point to a valid `EngineParams`, or be NULL (ignored).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_update_params(control: *mut GranumControl, params: *const EngineParams) {
    if control.is_null() || params.is_null() {
        return;
    }
    unsafe { (*control).inner.update_params(std::ptr::read(params)) };
}

/// Replace the engine configuration without ramping.
///
/// # Safety
/// `params` must point to a valid `EngineParams`, or be NULL (ignored).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_update_params_immediate(
    control: *mut GranumControl,
    params: *const EngineParams,
) {
    if control.is_null() || params.is_null() {
        return;
    }
    unsafe { (*control).inner.update_params_immediate(std::ptr::read(params)) };
}

/// Set one parameter by ID. Returns false for an unknown ID.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_set_param(control: *mut GranumControl, id: ParamId, value: f32) -> bool {
    if control.is_null() {
        return false;
    }
    unsafe { (*control).inner.set_param(id, value) }
}

/// Read back the most recently sent value of a parameter.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_get_param(control: *const GranumControl, id: ParamId) -> f32 {
    if control.is_null() {
        return 0.0;
    }
    unsafe { (*control).inner.params().get(id).unwrap_or(0.0) }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Transport & Position
// ═══════════════════════════════════════════════════════════════════════════

#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_start(control: *mut GranumControl) {
    if control.is_null() {
        return;
    }
    unsafe { (*control).inner.start() };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_stop(control: *mut GranumControl) {
    if control.is_null() {
        return;
    }
    unsafe { (*control).inner.stop() };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_set_frozen(control: *mut GranumControl, frozen: bool, position: f32) {
    if control.is_null() {
        return;
    }
    unsafe { (*control).inner.set_frozen(frozen, position) };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_set_drift(
    control: *mut GranumControl,
    enabled: bool,
    base_position: f32,
    speed: f32,
    return_tendency: f32,
) {
    if control.is_null() {
        return;
    }
    unsafe {
        (*control)
            .inner
            .set_drift(enabled, base_position, speed, return_tendency)
    };
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Sample Buffer
// ═══════════════════════════════════════════════════════════════════════════

/// Copy `len` samples and hand them to the engine.
///
/// The copy happens on the calling thread; the engine swaps buffers at the
/// next `engine_process_commands`.
///
/// # Safety
/// `samples` must point to at least `len` floats, or be NULL (ignored).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_load_buffer(
    control: *mut GranumControl,
    samples: *const f32,
    len: usize,
    channels: u32,
) {
    if control.is_null() || samples.is_null() {
        return;
    }
    let data = unsafe { std::slice::from_raw_parts(samples, len) }.to_vec();
    unsafe { (*control).inner.load_buffer(data, channels as usize) };
}

/// Free buffers the engine has swapped out. Returns how many were freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_collect_retired(control: *mut GranumControl) -> u32 {
    if control.is_null() {
        return 0;
    }
    unsafe { (*control).inner.collect_retired() as u32 }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control - Events & Readback
// ═══════════════════════════════════════════════════════════════════════════

/// Drain pending grain events into `out`.
///
/// Returns the number written. Events beyond `capacity` are discarded.
///
/// # Safety
/// `out` must have space for `capacity` events, or be NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_poll_events(
    control: *mut GranumControl,
    out: *mut GrainEvent,
    capacity: u32,
) -> u32 {
    if control.is_null() {
        return 0;
    }
    let events = unsafe { (*control).inner.poll_events() };
    if out.is_null() {
        return 0;
    }

    let count = events.len().min(capacity as usize);
    let out = unsafe { std::slice::from_raw_parts_mut(out, count) };
    out.copy_from_slice(&events[..count]);
    count as u32
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_clear_events(control: *mut GranumControl) {
    if control.is_null() {
        return;
    }
    unsafe { (*control).inner.clear_events() };
}

/// Get the current engine readback state.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn control_get_readback(control: *const GranumControl) -> GranumReadback {
    if control.is_null() {
        return EngineReadback::default().into();
    }
    unsafe { (*control).inner.readback().into() }
}

// ═══════════════════════════════════════════════════════════════════════════
// Engine - Audio Thread
// ═══════════════════════════════════════════════════════════════════════════

/// Apply pending control commands. Call at the start of each audio callback.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_process_commands(engine: *mut GranumEngine) {
    if engine.is_null() {
        return;
    }
    unsafe { (*engine).inner.process_commands() };
}

/// Render `frames` frames into separate left/right buffers.
///
/// Buffers are filled with silence if the handle is NULL.
///
/// # Safety
/// - Must be called from the audio thread
/// - Output buffers must have space for `frames` samples
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_render(
    engine: *mut GranumEngine,
    frames: u32,
    output_left: *mut f32,
    output_right: *mut f32,
) {
    let total_frames = frames as usize;

    if engine.is_null() || output_left.is_null() || output_right.is_null() {
        if !output_left.is_null() {
            unsafe { std::ptr::write_bytes(output_left, 0, total_frames) };
        }
        if !output_right.is_null() {
            unsafe { std::ptr::write_bytes(output_right, 0, total_frames) };
        }
        return;
    }

    let out_left = unsafe { std::slice::from_raw_parts_mut(output_left, total_frames) };
    let out_right = unsafe { std::slice::from_raw_parts_mut(output_right, total_frames) };
    unsafe { (*engine).inner.process(out_left, out_right) };
}

/// Render audio to an interleaved stereo buffer: [L0, R0, L1, R1, ...]
///
/// # Safety
/// - `output` must have space for `frames * 2` floats
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_render_interleaved(engine: *mut GranumEngine, frames: u32, output: *mut f32) {
    let total_frames = frames as usize;

    if engine.is_null() || output.is_null() {
        if !output.is_null() {
            unsafe { std::ptr::write_bytes(output, 0, total_frames * 2) };
        }
        return;
    }

    let handle = unsafe { &mut (*engine).inner };
    let out_slice = unsafe { std::slice::from_raw_parts_mut(output, total_frames * 2) };

    // Render through the engine's planar block buffers, one block at a time
    let mut offset = 0;
    while offset < total_frames {
        let chunk_frames = handle.process_internal(total_frames - offset);
        if chunk_frames == 0 {
            out_slice[offset * 2..].fill(0.0);
            break;
        }

        let grain_engine = handle.engine();
        let left = &grain_engine.output_left()[..chunk_frames];
        let right = &grain_engine.output_right()[..chunk_frames];
        let out_chunk = &mut out_slice[offset * 2..(offset + chunk_frames) * 2];
        for (frame, (&l, &r)) in out_chunk.chunks_exact_mut(2).zip(left.iter().zip(right)) {
            frame[0] = l;
            frame[1] = r;
        }

        offset += chunk_frames;
    }
}

/// Re-initialize for a new sample rate.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_init(engine: *mut GranumEngine, sample_rate: f32) {
    if engine.is_null() {
        return;
    }
    unsafe { (*engine).inner.engine_mut().init(sample_rate) };
}

/// Allocate engine-owned sample storage and return a pointer to write into.
///
/// The engine is silent until `engine_commit_buffer`. The caller must not
/// render concurrently with this call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_allocate_buffer(engine: *mut GranumEngine, len: usize) -> *mut f32 {
    if engine.is_null() {
        return std::ptr::null_mut();
    }
    unsafe { (*engine).inner.engine_mut().allocate_buffer(len).as_mut_ptr() }
}

/// Mark the allocated buffer as valid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_commit_buffer(engine: *mut GranumEngine, channels: u32, len: usize) {
    if engine.is_null() {
        return;
    }
    unsafe {
        (*engine)
            .inner
            .engine_mut()
            .commit_buffer(channels as usize, len)
    };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_is_playing(engine: *const GranumEngine) -> bool {
    if engine.is_null() {
        return false;
    }
    unsafe { (*engine).inner.engine().is_playing() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_get_active_grains(engine: *const GranumEngine) -> u32 {
    if engine.is_null() {
        return 0;
    }
    unsafe { (*engine).inner.engine().active_grain_count() as u32 }
}

/// Gain the host should apply to the rendered output.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_get_volume(engine: *const GranumEngine) -> f32 {
    if engine.is_null() {
        return 0.0;
    }
    unsafe { (*engine).inner.engine().smoothed_volume() }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parameter Metadata
// ═══════════════════════════════════════════════════════════════════════════

#[unsafe(no_mangle)]
pub extern "C" fn granum_param_count() -> u32 {
    engine_param_infos().len() as u32
}

/// Fill `out` with the range of parameter `id`. Returns false for an
/// unknown ID.
///
/// # Safety
/// `out` must be a valid pointer to a `GranumParamInfo`, or NULL.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn granum_param_info(id: ParamId, out: *mut GranumParamInfo) -> bool {
    let Some(info) = param_info(id) else {
        return false;
    };
    if out.is_null() {
        return false;
    }
    unsafe {
        *out = GranumParamInfo {
            id: info.id,
            min_value: info.min,
            max_value: info.max,
            default_value: info.default,
            step: info.step,
        };
    }
    true
}

// ═══════════════════════════════════════════════════════════════════════════
// Parameter ID Constants
// ═══════════════════════════════════════════════════════════════════════════

#[unsafe(no_mangle)]
pub static PARAM_GRAIN_SIZE: u32 = param_ids::GRAIN_SIZE;

#[unsafe(no_mangle)]
pub static PARAM_DENSITY: u32 = param_ids::DENSITY;

#[unsafe(no_mangle)]
pub static PARAM_SPREAD: u32 = param_ids::SPREAD;

#[unsafe(no_mangle)]
pub static PARAM_POSITION: u32 = param_ids::POSITION;

#[unsafe(no_mangle)]
pub static PARAM_REVERSAL_CHANCE: u32 = param_ids::REVERSAL_CHANCE;

#[unsafe(no_mangle)]
pub static PARAM_PAN: u32 = param_ids::PAN;

#[unsafe(no_mangle)]
pub static PARAM_PAN_SPREAD: u32 = param_ids::PAN_SPREAD;

#[unsafe(no_mangle)]
pub static PARAM_PITCH: u32 = param_ids::PITCH;

#[unsafe(no_mangle)]
pub static PARAM_DETUNE: u32 = param_ids::DETUNE;

#[unsafe(no_mangle)]
pub static PARAM_FM_FREQ: u32 = param_ids::FM_FREQ;

#[unsafe(no_mangle)]
pub static PARAM_FM_AMOUNT: u32 = param_ids::FM_AMOUNT;

#[unsafe(no_mangle)]
pub static PARAM_ATTACK: u32 = param_ids::ATTACK;

#[unsafe(no_mangle)]
pub static PARAM_RELEASE: u32 = param_ids::RELEASE;

#[unsafe(no_mangle)]
pub static PARAM_ENVELOPE_CURVE: u32 = param_ids::ENVELOPE_CURVE;

#[unsafe(no_mangle)]
pub static PARAM_LFO_RATE: u32 = param_ids::LFO_RATE;

#[unsafe(no_mangle)]
pub static PARAM_LFO_AMOUNT: u32 = param_ids::LFO_AMOUNT;

#[unsafe(no_mangle)]
pub static PARAM_LFO_SHAPE: u32 = param_ids::LFO_SHAPE;

#[unsafe(no_mangle)]
pub static PARAM_VOLUME: u32 = param_ids::VOLUME;

#[unsafe(no_mangle)]
pub static PARAM_FILTER_FREQ: u32 = param_ids::FILTER_FREQ;

#[unsafe(no_mangle)]
pub static PARAM_FILTER_RES: u32 = param_ids::FILTER_RES;

#[unsafe(no_mangle)]
pub static PARAM_DIST_AMOUNT: u32 = param_ids::DIST_AMOUNT;

#[unsafe(no_mangle)]
pub static PARAM_DELAY_TIME: u32 = param_ids::DELAY_TIME;

#[unsafe(no_mangle)]
pub static PARAM_DELAY_FEEDBACK: u32 = param_ids::DELAY_FEEDBACK;

#[unsafe(no_mangle)]
pub static PARAM_DELAY_MIX: u32 = param_ids::DELAY_MIX;

#[unsafe(no_mangle)]
pub static PARAM_REVERB_MIX: u32 = param_ids::REVERB_MIX;

#[unsafe(no_mangle)]
pub static PARAM_REVERB_DECAY: u32 = param_ids::REVERB_DECAY;
