// src/state/readback.rs

/// Engine state exposed to the control side (for meters/displays).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineReadback {
    /// Engine time in seconds.
    pub current_time: f64,

    /// Number of grains currently sounding.
    pub active_grains: usize,

    /// Grain events not yet collected by the host.
    pub pending_events: usize,

    /// Smoothed output gain the host should apply.
    pub volume: f32,

    /// Whether playback is running.
    pub playing: bool,
}
