// src/lib.rs
//
// Library entry point for Rust, FFI (iOS/Swift) and wasm consumers.

mod bridge;
mod drift;
mod engine;
mod envelope;
mod event;
mod grain;
mod grain_pool;
mod lfo;
mod modulation;
mod parameter;
mod rng;
mod sample_buffer;
mod scheduler;
mod state;

#[cfg(feature = "ios")]
pub mod ffi;

#[cfg(feature = "web")]
pub mod wasm;

// Re-export key types for Rust consumers
pub use bridge::{ControlHandle, EngineHandle, create_bridge};
pub use engine::{EffectParams, GrainEngine};
pub use envelope::{EnvelopeCurve, EnvelopeShape};
pub use event::{GrainEvent, MAX_GRAIN_EVENTS};
pub use grain::{Grain, equal_power_pan, pitch_to_rate};
pub use grain_pool::MAX_GRAINS;
pub use lfo::{LfoShape, lfo_value};
pub use modulation::{ModTarget, ModTargets, modulate};
pub use parameter::ParamSmoother;
pub use rng::XorShift32;
pub use sample_buffer::BufferError;
pub use scheduler::{MAX_GRAIN_INTERVAL, MIN_GRAIN_INTERVAL};
pub use state::{
    Command, EngineConfig, EngineParams, EngineReadback, ParamId, ParamInfo, ParamUnit,
    engine_param_infos, param_ids, param_info,
};
