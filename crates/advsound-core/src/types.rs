//! Core domain types for advsound.

pub mod id;
pub mod pcm;
pub mod playback;
pub mod position;
pub mod resource;
pub mod volume;

pub use id::SoundId;
pub use pcm::PcmBuffer;
pub use playback::{PlaybackState, Transition};
pub use position::{Attenuation, Position};
pub use resource::SoundResource;
pub use volume::Volume;
