//! Per-sound record kept by the controller.

use advsound_core::{PlaybackState, SoundId, SoundResource, Volume};

/// Everything the controller knows about one queued sound.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundHandle {
    id: SoundId,
    /// Name of the streaming source in the backend.
    source: String,
    resource: SoundResource,
    looping: bool,
    priority: bool,
    state: PlaybackState,
    /// Volume to restore on unmute. Present only while muted.
    pre_mute: Option<Volume>,
}

impl SoundHandle {
    pub fn new(
        id: SoundId,
        source: impl Into<String>,
        resource: SoundResource,
        looping: bool,
        priority: bool,
    ) -> Self {
        Self {
            id,
            source: source.into(),
            resource,
            looping,
            priority,
            state: PlaybackState::Stopped,
            pre_mute: None,
        }
    }

    pub const fn id(&self) -> SoundId {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn resource(&self) -> &SoundResource {
        &self.resource
    }

    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    pub const fn is_priority(&self) -> bool {
        self.priority
    }

    /// Last state the controller drove the sound into.
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
    }

    pub const fn is_muted(&self) -> bool {
        self.pre_mute.is_some()
    }

    pub const fn pre_mute_volume(&self) -> Option<Volume> {
        self.pre_mute
    }

    /// Remember `volume` and enter the muted state.
    pub fn mute(&mut self, volume: Volume) {
        self.pre_mute = Some(volume);
    }

    /// Leave the muted state, returning the volume to restore.
    pub fn unmute(&mut self) -> Option<Volume> {
        self.pre_mute.take()
    }
}
