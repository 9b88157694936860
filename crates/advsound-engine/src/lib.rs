//! # advsound-engine
//!
//! Bounded sound handle registry and the controller that drives a
//! [`Backend`](advsound_backend::Backend) through it.
//!
//! Features:
//! - Integer sound ids drawn from a fixed capacity, lowest free id first
//! - Guarded play, pause, resume, mute and unmute transitions
//! - Volume in integer percent, clamped to `[0, 100]`
//! - Injected logging scoped to the controller's lifetime

pub mod controller;
pub mod handle;
pub mod log;
pub mod slots;

#[cfg(test)]
mod testing;

pub use controller::SoundController;
pub use handle::SoundHandle;
pub use log::SoundLog;
pub use slots::HandleSlots;

/// Version of the controller API exposed to hosts.
pub const API_VERSION: u32 = 1;
