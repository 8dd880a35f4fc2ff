//! Thread-safe bridge between the control thread and the grain engine.
//!
//! # Architecture
//!
//! - **Control thread** owns [`ControlHandle`] with a local [`EngineParams`] copy
//! - **Audio thread** owns [`EngineHandle`] with the [`GrainEngine`]
//! - Commands travel over an MPSC channel and are applied between blocks
//! - Grain events come back over a bounded channel, readback over atomics
//! - Replaced sample buffers are sent back so they are freed off the audio thread
//!
//! # Usage
//!
//! ```ignore
//! let (mut control, mut engine) = create_bridge(GrainEngine::new());
//!
//! // Control thread
//! control.load_buffer(samples, 1);
//! control.set_param(param_ids::DENSITY, 0.05);
//! control.start();
//!
//! // Audio thread
//! engine.process_commands();
//! engine.process(&mut left, &mut right);
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering},
    mpsc::{self, Receiver, Sender, SyncSender},
};

use log::{debug, warn};

use crate::engine::GrainEngine;
use crate::event::{GrainEvent, MAX_GRAIN_EVENTS};
use crate::state::{Command, EngineParams, EngineReadback, ParamId};

/// Handle for the control thread.
///
/// All methods are non-blocking and safe to call from a UI thread.
pub struct ControlHandle {
    /// Last configuration sent to the engine.
    params: EngineParams,

    command_tx: Sender<Command>,

    /// Grain events forwarded by the engine.
    event_rx: Receiver<GrainEvent>,

    /// Buffers the engine no longer references.
    retired_rx: Receiver<Vec<f32>>,

    readback: Arc<SharedReadback>,
}

/// Handle for the audio thread, owning the engine.
pub struct EngineHandle {
    engine: GrainEngine,

    command_rx: Receiver<Command>,
    event_tx: SyncSender<GrainEvent>,
    retired_tx: Sender<Vec<f32>>,

    readback: Arc<SharedReadback>,
}

/// Lock-free engine -> control readback.
struct SharedReadback {
    /// f64 bits (no AtomicF64 in std)
    current_time_bits: AtomicU64,
    active_grains: AtomicUsize,
    /// Events sent but not yet polled
    pending_events: AtomicUsize,
    /// f32 bits
    volume_bits: AtomicU32,
    playing: AtomicBool,
}

impl SharedReadback {
    fn new() -> Self {
        Self {
            current_time_bits: AtomicU64::new(0.0_f64.to_bits()),
            active_grains: AtomicUsize::new(0),
            pending_events: AtomicUsize::new(0),
            volume_bits: AtomicU32::new(0.0_f32.to_bits()),
            playing: AtomicBool::new(false),
        }
    }
}

/// Create a linked pair of handles around `engine`.
pub fn create_bridge(engine: GrainEngine) -> (ControlHandle, EngineHandle) {
    let (command_tx, command_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::sync_channel(MAX_GRAIN_EVENTS);
    let (retired_tx, retired_rx) = mpsc::channel();
    let readback = Arc::new(SharedReadback::new());

    let control = ControlHandle {
        params: *engine.params(),
        command_tx,
        event_rx,
        retired_rx,
        readback: Arc::clone(&readback),
    };

    let engine_handle = EngineHandle {
        engine,
        command_rx,
        event_tx,
        retired_tx,
        readback,
    };
    engine_handle.sync_readback();

    (control, engine_handle)
}

// ═══════════════════════════════════════════════════════════════════
// ControlHandle - Control Thread API
// ═══════════════════════════════════════════════════════════════════

impl ControlHandle {
    /// The configuration most recently sent.
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Send a command to the engine.
    ///
    /// Also updates the local parameter copy for immediate feedback.
    pub fn send(&mut self, cmd: Command) {
        if let Command::UpdateParams(params) | Command::UpdateParamsImmediate(params) = &cmd {
            self.params = *params;
        }
        if self.command_tx.send(cmd).is_err() {
            warn!("Engine handle dropped; command discarded");
        }
    }

    /// Set one parameter by ID and send the updated configuration.
    ///
    /// Returns `false` for an unknown ID.
    pub fn set_param(&mut self, id: ParamId, value: f32) -> bool {
        let mut params = self.params;
        if !params.set(id, value) {
            warn!("Unknown parameter id {}", id);
            return false;
        }
        self.send(Command::UpdateParams(params));
        true
    }

    pub fn update_params(&mut self, params: EngineParams) {
        self.send(Command::UpdateParams(params));
    }

    pub fn update_params_immediate(&mut self, params: EngineParams) {
        self.send(Command::UpdateParamsImmediate(params));
    }

    pub fn start(&mut self) {
        self.send(Command::Start);
    }

    pub fn stop(&mut self) {
        self.send(Command::Stop);
    }

    pub fn set_frozen(&mut self, frozen: bool, position: f32) {
        self.send(Command::SetFrozen { frozen, position });
    }

    pub fn set_drift(&mut self, enabled: bool, base_position: f32, speed: f32, return_tendency: f32) {
        self.send(Command::SetDrift {
            enabled,
            base_position,
            speed,
            return_tendency,
        });
    }

    /// Hand a fully written buffer to the engine.
    pub fn load_buffer(&mut self, samples: Vec<f32>, channels: usize) {
        debug!("Loading {} samples ({} ch)", samples.len(), channels);
        self.send(Command::LoadBuffer { samples, channels });
    }

    /// Discard undelivered events on both sides.
    pub fn clear_events(&mut self) {
        self.send(Command::ClearEvents);
        self.poll_events();
    }

    /// Drain forwarded grain events.
    pub fn poll_events(&self) -> Vec<GrainEvent> {
        let events: Vec<GrainEvent> = self.event_rx.try_iter().collect();
        self.readback
            .pending_events
            .fetch_sub(events.len(), Ordering::Relaxed);
        events
    }

    /// Free buffers the engine has released. Returns how many were freed.
    pub fn collect_retired(&self) -> usize {
        self.retired_rx.try_iter().count()
    }

    pub fn readback(&self) -> EngineReadback {
        EngineReadback {
            current_time: f64::from_bits(self.readback.current_time_bits.load(Ordering::Relaxed)),
            active_grains: self.readback.active_grains.load(Ordering::Relaxed),
            pending_events: self.readback.pending_events.load(Ordering::Relaxed),
            volume: f32::from_bits(self.readback.volume_bits.load(Ordering::Relaxed)),
            playing: self.readback.playing.load(Ordering::Relaxed),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// EngineHandle - Audio Thread API
// ═══════════════════════════════════════════════════════════════════

impl EngineHandle {
    /// Apply all pending commands.
    ///
    /// Call this at the start of each audio block.
    pub fn process_commands(&mut self) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            self.apply(cmd);
        }
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::UpdateParams(params) => self.engine.update_params(&params),
            Command::UpdateParamsImmediate(params) => self.engine.update_params_immediate(&params),
            Command::Start => self.engine.start(),
            Command::Stop => self.engine.stop(),
            Command::SetFrozen { frozen, position } => self.engine.set_frozen(frozen, position),
            Command::SetDrift {
                enabled,
                base_position,
                speed,
                return_tendency,
            } => self
                .engine
                .set_drift(enabled, base_position, speed, return_tendency),
            Command::LoadBuffer { samples, channels } => {
                let old = self.engine.replace_buffer(samples, channels);
                // Control side dropped: nothing to hand back to
                let _ = self.retired_tx.send(old);
            }
            Command::ClearEvents => self.engine.clear_events(),
        }
    }

    /// Render one block, forward its grain events and update readback.
    ///
    /// Call this once per audio block from the audio callback.
    #[inline]
    pub fn process(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
        self.engine.process(out_left, out_right);
        self.forward_events();
        self.sync_readback();
    }

    /// Render up to one block into the engine's own output buffers, then
    /// forward events and update readback.
    ///
    /// Returns the number of frames rendered.
    pub fn process_internal(&mut self, frames: usize) -> usize {
        let rendered = self.engine.process_internal(frames);
        self.forward_events();
        self.sync_readback();
        rendered
    }

    /// Move logged events into the control channel.
    ///
    /// Events that do not fit are dropped, like a full log.
    fn forward_events(&mut self) {
        for event in self.engine.events() {
            // Count first so a concurrent poll never sees more events than the counter
            self.readback.pending_events.fetch_add(1, Ordering::Relaxed);
            if self.event_tx.try_send(*event).is_err() {
                self.readback.pending_events.fetch_sub(1, Ordering::Relaxed);
                break;
            }
        }
        self.engine.clear_events();
    }

    /// Publish engine state to the control side.
    pub fn sync_readback(&self) {
        let rb = self.engine.readback();
        self.readback
            .current_time_bits
            .store(rb.current_time.to_bits(), Ordering::Relaxed);
        self.readback
            .active_grains
            .store(rb.active_grains, Ordering::Relaxed);
        self.readback
            .volume_bits
            .store(rb.volume.to_bits(), Ordering::Relaxed);
        self.readback.playing.store(rb.playing, Ordering::Relaxed);
    }

    pub fn engine(&self) -> &GrainEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GrainEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::param_ids;

    fn render(engine: &mut EngineHandle, blocks: usize) {
        let mut left = [0.0; 128];
        let mut right = [0.0; 128];
        for _ in 0..blocks {
            engine.process_commands();
            engine.process(&mut left, &mut right);
        }
    }

    #[test]
    fn test_commands_reach_engine() {
        let (mut control, mut engine) = create_bridge(GrainEngine::new());
        control.start();
        control.set_frozen(true, 0.25);
        control.set_drift(true, 0.5, 1.0, 0.2);
        engine.process_commands();

        assert!(engine.engine().is_playing());
        assert!(engine.engine().is_frozen());
        assert!(engine.engine().is_drifting());

        control.stop();
        engine.process_commands();
        assert!(!engine.engine().is_playing());
    }

    #[test]
    fn test_set_param_clamps_and_sends() {
        let (mut control, mut engine) = create_bridge(GrainEngine::new());
        assert!(control.set_param(param_ids::GRAIN_SIZE, 3.0));
        assert_eq!(control.params().grain_size, 0.5);
        assert!(!control.set_param(1000, 1.0));

        engine.process_commands();
        assert_eq!(engine.engine().params().grain_size, 0.5);
    }

    #[test]
    fn test_load_buffer_retires_previous() {
        let (mut control, mut engine) = create_bridge(GrainEngine::new());
        control.load_buffer(vec![0.5; 1000], 1);
        control.load_buffer(vec![0.25; 2000], 1);
        engine.process_commands();

        assert_eq!(engine.engine().buffer_len(), 2000);
        assert_eq!(control.collect_retired(), 2);
    }

    #[test]
    fn test_events_and_readback_flow_back() {
        let (mut control, mut engine) = create_bridge(GrainEngine::new());
        control.load_buffer(vec![0.5; 48_000], 1);
        control.update_params_immediate(EngineParams {
            density: 0.02,
            ..Default::default()
        });
        control.start();
        render(&mut engine, 20);

        let rb = control.readback();
        assert!(rb.playing);
        assert!(rb.active_grains > 0);
        assert!(rb.current_time > 0.05);
        assert!(rb.pending_events > 0);

        let events = control.poll_events();
        assert_eq!(events.len(), rb.pending_events);
        assert_eq!(control.readback().pending_events, 0);
        assert!(events.iter().all(|e| (0.0..=1.0).contains(&e.norm_position)));
    }

    #[test]
    fn test_event_channel_is_bounded() {
        let (mut control, mut engine) = create_bridge(GrainEngine::new());
        control.load_buffer(vec![0.1; 48_000], 1);
        control.update_params_immediate(EngineParams {
            density: 0.005,
            grain_size: 0.01,
            ..Default::default()
        });
        control.start();
        // ~3 seconds of onsets without polling
        render(&mut engine, 1200);

        assert_eq!(control.poll_events().len(), MAX_GRAIN_EVENTS);
    }
}
