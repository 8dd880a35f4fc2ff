// src/state/command.rs
//
// Commands from the control side to the engine.
//
// Commands are the ONLY way a bridged host mutates engine state.
// They are queued and applied between audio blocks.

use super::EngineParams;

/// A command from the control thread to the engine.
///
/// Commands are:
/// - Immutable once created
/// - Processed asynchronously by the engine bridge
/// - Applied atomically, never mid-block
#[derive(Debug, Clone)]
pub enum Command {
    // ═══════════════════════════════════════════
    // Parameters
    // ═══════════════════════════════════════════
    /// Replace the configuration; continuous values ramp to the new targets.
    UpdateParams(EngineParams),

    /// Replace the configuration and snap smoothers to it.
    UpdateParamsImmediate(EngineParams),

    // ═══════════════════════════════════════════
    // Transport
    // ═══════════════════════════════════════════
    Start,

    /// Stop playback and hard-mute every grain.
    Stop,

    // ═══════════════════════════════════════════
    // Spawn position sources
    // ═══════════════════════════════════════════
    SetFrozen {
        frozen: bool,
        position: f32,
    },

    SetDrift {
        enabled: bool,
        base_position: f32,
        speed: f32,
        return_tendency: f32,
    },

    // ═══════════════════════════════════════════
    // Source audio
    // ═══════════════════════════════════════════
    /// Swap in a fully written mono buffer.
    LoadBuffer { samples: Vec<f32>, channels: usize },

    // ═══════════════════════════════════════════
    // Visualization
    // ═══════════════════════════════════════════
    ClearEvents,
}
