// src/state/mod.rs
//
// Control-side declarative state.
//
// This module contains the data a host builds and hands to the engine:
// - the configuration snapshot and its metadata
// - construction-time config
// - commands for the bridge and the readback coming back
//
// The engine copies what it needs; nothing here is shared mutably with the
// audio thread.

mod command;
mod config;
mod param_info;
mod params;
mod readback;

pub use command::*;
pub use config::*;
pub use param_info::*;
pub use params::*;
pub use readback::*;
