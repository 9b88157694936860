//! # advsound-backend
//!
//! The sound-engine capability interface and its two mixers.
//!
//! Features:
//! - `Backend` trait consumed by the sound controller
//! - Codec registry with symphonia as the fallback decoder
//! - Sample-rate conversion with rubato
//! - `SoftwareMixer`: all voices summed into one cpal stream
//! - `HardwareMixer`: one cpal stream per voice from a bounded pool

pub mod backend;
pub mod bank;
pub mod codec;
pub mod decode;
pub mod fetch;
pub mod hardware;
pub mod output;
pub mod resample;
pub mod software;
pub mod voice;

pub use backend::{Backend, StreamingSource};
pub use codec::{Codec, CodecRegistry, SymphoniaCodec};
pub use hardware::HardwareMixer;
pub use output::OutputConfig;
pub use software::SoftwareMixer;
