//! The capability interface every mixer technology implements.

use advsound_core::{Attenuation, Position, Result, SoundResource};

use crate::codec::Codec;

/// Parameters for a backend streaming source.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingSource {
    /// Priority sources are never evicted to make room for others.
    pub priority: bool,
    /// Name of the source in the backend's namespace.
    pub name: String,
    pub resource: SoundResource,
    pub looped: bool,
    pub attenuation: Attenuation,
    /// Rolloff factor, or fade distance for linear attenuation.
    pub rolloff: f32,
}

/// Sound-engine backend driven by a sound controller.
///
/// Sources are addressed by name. Calls happen on one control thread; a
/// backend may run its own audio threads internally.
pub trait Backend {
    /// Short name for diagnostics.
    fn label(&self) -> &'static str;

    /// One-time startup. Must succeed before sources can be created.
    fn initialize(&mut self) -> Result<()>;

    fn is_initialized(&self) -> bool;

    /// Create a streaming playback source.
    fn new_streaming_source(&mut self, source: StreamingSource) -> Result<()>;

    /// Fetch and decode audio for `name`.
    fn load(&mut self, resource: &SoundResource, name: &str) -> Result<()>;

    fn set_position(&mut self, name: &str, position: Position) -> Result<()>;

    fn play(&mut self, name: &str) -> Result<()>;

    /// Play `name` as background music: unattenuated and unaffected by
    /// [`Backend::set_position`] until it is stopped.
    fn background_music(&mut self, name: &str, looped: bool) -> Result<()>;

    fn pause(&mut self, name: &str) -> Result<()>;

    /// Stop and rewind.
    fn stop(&mut self, name: &str) -> Result<()>;

    /// Release the source named `source` and the audio loaded as `sound`.
    fn dequeue(&mut self, source: &str, sound: &str);

    fn playing(&self, name: &str) -> bool;

    /// Linear gain in `[0.0, 1.0]`.
    fn volume(&self, name: &str) -> f32;

    fn set_volume(&mut self, name: &str, volume: f32) -> Result<()>;

    /// Release every source and shut the output down.
    fn cleanup(&mut self);

    /// Register a decoder for a format tag (file extension).
    fn install_codec(&mut self, format: &str, codec: Box<dyn Codec>);

    /// Number of codecs registered through [`Backend::install_codec`].
    fn codec_count(&self) -> usize;

    fn has_custom_midi_codec(&self) -> bool;
}
