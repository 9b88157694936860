//! Sound controller: the public face of advsound.
//!
//! The controller hands out integer sound ids, keeps one [`SoundHandle`] per
//! live id and drives a [`Backend`] through guarded transitions. Unknown ids
//! are never an error at this level: queries answer `false` or `None` and
//! transitions answer [`Transition::Unknown`].
//!
//! Backend faults during `initialize` and `queue` are logged and returned.
//! Faults during playback control are logged and the sound keeps its state.

use advsound_backend::{Backend, Codec, StreamingSource};
use advsound_core::{
    Attenuation, ControllerConfig, Error, PlaybackState, Position, Result, SoundId, SoundResource,
    Transition, Volume,
};

use crate::handle::SoundHandle;
use crate::log::SoundLog;
use crate::slots::HandleSlots;

/// Attenuation model given to every streaming source.
pub const STREAM_ATTENUATION: Attenuation = Attenuation::Rolloff;

/// Rolloff factor given to every streaming source.
pub const STREAM_ROLLOFF: f32 = 0.8;

/// Bounded registry of sounds played through one backend.
pub struct SoundController<B: Backend> {
    backend: B,
    slots: HandleSlots,
    log: SoundLog,
}

impl<B: Backend> SoundController<B> {
    /// Create a controller with the default capacity.
    pub fn new(backend: B, log: SoundLog) -> Self {
        Self::with_config(backend, &ControllerConfig::default(), log)
    }

    pub fn with_config(backend: B, config: &ControllerConfig, log: SoundLog) -> Self {
        Self {
            backend,
            slots: HandleSlots::new(config.capacity),
            log,
        }
    }

    /// Start the backend and open the log scope.
    ///
    /// On failure the controller stays unusable until a later call succeeds.
    pub fn initialize(&mut self) -> Result<()> {
        let label = self.backend.label();
        self.log.open(label);
        self.log.info(format_args!("Initializing {label} backend"));
        self.log.debug(format_args!(
            "{} codecs linked, {} sound handles",
            self.backend.codec_count(),
            self.slots.capacity()
        ));

        match self.backend.initialize() {
            Ok(()) => {
                self.log.info(format_args!("{label} backend set up"));
                Ok(())
            }
            Err(e) => {
                self.log
                    .error(format_args!("Failed to initialize {label} backend: {e}"));
                Err(match e {
                    Error::BackendInit(_) => e,
                    other => Error::BackendInit(other.to_string()),
                })
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }

    /// Stop and release every sound, then shut the backend down.
    ///
    /// The controller must be initialized again before it can queue.
    pub fn cleanup(&mut self) {
        let handles = self.slots.drain();
        for handle in &handles {
            if self.backend.playing(handle.source()) {
                if let Err(e) = self.backend.stop(handle.source()) {
                    report(&self.log, "stop", handle, &e);
                }
            }
            self.backend.dequeue(handle.source(), handle.source());
        }
        self.backend.cleanup();

        self.log.info(format_args!(
            "Released {} sounds, {} backend shut down",
            handles.len(),
            self.backend.label()
        ));
        self.log.close();
    }

    /// Queue the sound `filename` found at `uri` and return its id.
    ///
    /// `uri` is either the full location of the sound or a directory the
    /// filename is joined onto. The sound is loaded but not started.
    pub fn queue(
        &mut self,
        uri: &str,
        filename: &str,
        looped: bool,
        priority: bool,
    ) -> Result<SoundId> {
        let result = self.try_queue(uri, filename, looped, priority);
        if let Err(e) = &result {
            if e.is_recoverable() {
                self.log
                    .warn(format_args!("Cannot queue '{filename}' right now: {e}"));
            } else {
                self.log
                    .error(format_args!("Failed to queue '{filename}' from '{uri}': {e}"));
            }
        }
        result
    }

    fn try_queue(
        &mut self,
        uri: &str,
        filename: &str,
        looped: bool,
        priority: bool,
    ) -> Result<SoundId> {
        if !self.backend.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let resource = SoundResource::resolve(uri, filename)?;
        let id = self.slots.allocate()?;
        let name = format!("{id}:{filename}");

        let source = StreamingSource {
            priority,
            name: name.clone(),
            resource: resource.clone(),
            looped,
            attenuation: STREAM_ATTENUATION,
            rolloff: STREAM_ROLLOFF,
        };
        let setup = self
            .backend
            .new_streaming_source(source)
            .and_then(|()| self.backend.load(&resource, &name));

        if let Err(e) = setup {
            self.backend.dequeue(&name, &name);
            self.slots.release(id);
            return Err(e);
        }

        self.log.debug(format_args!(
            "Queued sound {id} from {} (looped={looped}, priority={priority})",
            resource.location
        ));
        self.slots
            .insert(id, SoundHandle::new(id, name, resource, looped, priority))?;
        Ok(id)
    }

    /// Release the sound and reclaim its id.
    pub fn dequeue(&mut self, id: SoundId) {
        let Some(handle) = self.slots.remove(id) else {
            self.log.warn(format_args!("Sound {id} doesn't exist"));
            return;
        };
        self.backend.dequeue(handle.source(), handle.source());
        self.log.debug(format_args!(
            "Dequeued sound {id}, {}/{} in use",
            self.slots.len(),
            self.slots.capacity()
        ));
    }

    /// Start the sound where it is. Returns false if it does not exist or
    /// the backend refused.
    pub fn play(&mut self, id: SoundId) -> bool {
        self.start(id, None)
    }

    /// Place the sound on the listener's plane and start it.
    pub fn play_2d(&mut self, id: SoundId, x: f32, y: f32) -> bool {
        self.start(id, Some(Position::planar(x, y)))
    }

    pub fn play_3d(&mut self, id: SoundId, x: f32, y: f32, z: f32) -> bool {
        self.start(id, Some(Position::new(x, y, z)))
    }

    fn start(&mut self, id: SoundId, position: Option<Position>) -> bool {
        let Some(handle) = self.slots.get_mut(id) else {
            return false;
        };

        if let Some(position) = position {
            if let Err(e) = self.backend.set_position(handle.source(), position) {
                report(&self.log, "position", handle, &e);
            }
        }

        match self.backend.play(handle.source()) {
            Ok(()) => {
                handle.set_state(PlaybackState::Playing);
                true
            }
            Err(e) => {
                report(&self.log, "play", handle, &e);
                false
            }
        }
    }

    /// Play the sound as background music: full volume wherever it was
    /// placed, looping as requested. The sound leaves the background when it
    /// is stopped.
    pub fn play_in_background(&mut self, id: SoundId, looped: bool) -> bool {
        let Some(handle) = self.slots.get_mut(id) else {
            return false;
        };

        match self.backend.background_music(handle.source(), looped) {
            Ok(()) => {
                handle.set_state(PlaybackState::Playing);
                self.log.debug(format_args!(
                    "Sound {id} playing in background (looped={looped})"
                ));
                true
            }
            Err(e) => {
                report(&self.log, "play in background", handle, &e);
                false
            }
        }
    }

    pub fn pause(&mut self, id: SoundId) -> Transition {
        let Some(handle) = self.slots.get_mut(id) else {
            return Transition::Unknown;
        };
        let Some(next) = observed_state(&self.backend, handle).pause() else {
            return Transition::Unchanged;
        };

        let paused = match self.backend.pause(handle.source()) {
            Ok(()) => {
                handle.set_state(next);
                true
            }
            Err(e) => {
                report(&self.log, "pause", handle, &e);
                false
            }
        };
        Transition::guarded(paused)
    }

    /// Continue a sound that is not playing. A stopped sound starts over.
    pub fn resume(&mut self, id: SoundId) -> Transition {
        let Some(handle) = self.slots.get_mut(id) else {
            return Transition::Unknown;
        };
        let Some(next) = observed_state(&self.backend, handle).resume() else {
            return Transition::Unchanged;
        };

        let resumed = match self.backend.play(handle.source()) {
            Ok(()) => {
                handle.set_state(next);
                true
            }
            Err(e) => {
                report(&self.log, "resume", handle, &e);
                false
            }
        };
        Transition::guarded(resumed)
    }

    /// Stop and rewind the sound regardless of its state.
    pub fn stop(&mut self, id: SoundId) {
        let Some(handle) = self.slots.get_mut(id) else {
            self.log.debug(format_args!("Ignoring stop for missing sound {id}"));
            return;
        };
        if let Err(e) = self.backend.stop(handle.source()) {
            report(&self.log, "stop", handle, &e);
            return;
        }
        handle.set_state(PlaybackState::Stopped);
    }

    /// Stop every sound that is currently playing. Paused sounds stay paused.
    pub fn stop_all(&mut self) {
        let mut stopped = 0_usize;
        for handle in self.slots.iter_mut() {
            if !self.backend.playing(handle.source()) {
                continue;
            }
            match self.backend.stop(handle.source()) {
                Ok(()) => {
                    handle.set_state(PlaybackState::Stopped);
                    stopped += 1;
                }
                Err(e) => report(&self.log, "stop", handle, &e),
            }
        }
        self.log.debug(format_args!("Stopped {stopped} playing sounds"));
    }

    pub fn mute(&mut self, id: SoundId) -> Transition {
        let Some(handle) = self.slots.get_mut(id) else {
            return Transition::Unknown;
        };
        if handle.is_muted() {
            return Transition::Unchanged;
        }

        let current = Volume::from_gain(self.backend.volume(handle.source()));
        let muted = match self.backend.set_volume(handle.source(), Volume::MUTE.gain()) {
            Ok(()) => {
                handle.mute(current);
                true
            }
            Err(e) => {
                report(&self.log, "mute", handle, &e);
                false
            }
        };
        Transition::guarded(muted)
    }

    pub fn unmute(&mut self, id: SoundId) -> Transition {
        let Some(handle) = self.slots.get_mut(id) else {
            return Transition::Unknown;
        };
        let Some(restore) = handle.pre_mute_volume() else {
            return Transition::Unchanged;
        };

        let unmuted = match self.backend.set_volume(handle.source(), restore.gain()) {
            Ok(()) => handle.unmute().is_some(),
            Err(e) => {
                report(&self.log, "unmute", handle, &e);
                false
            }
        };
        Transition::guarded(unmuted)
    }

    /// Current volume as the backend reports it. Zero while muted.
    pub fn volume(&self, id: SoundId) -> Option<Volume> {
        self.slots
            .get(id)
            .map(|handle| Volume::from_gain(self.backend.volume(handle.source())))
    }

    /// Set the volume in percent, clamped to `[0, 100]`.
    ///
    /// An explicit volume takes a muted sound out of the muted state.
    pub fn set_volume(&mut self, id: SoundId, percent: i64) {
        let volume = Volume::clamped(percent);
        let Some(handle) = self.slots.get_mut(id) else {
            return;
        };

        if let Err(e) = self.backend.set_volume(handle.source(), volume.gain()) {
            report(&self.log, "set volume", handle, &e);
            return;
        }
        if handle.unmute().is_some() {
            self.log.debug(format_args!(
                "Sound {id} unmuted by volume change to {}",
                volume.percent()
            ));
        }
    }

    pub fn is_playing(&self, id: SoundId) -> bool {
        self.slots
            .get(id)
            .is_some_and(|handle| self.backend.playing(handle.source()))
    }

    /// True for a live sound that is not playing.
    pub fn is_paused(&self, id: SoundId) -> bool {
        self.slots
            .get(id)
            .is_some_and(|handle| !self.backend.playing(handle.source()))
    }

    pub fn is_looping(&self, id: SoundId) -> bool {
        self.slots.get(id).is_some_and(SoundHandle::is_looping)
    }

    pub fn is_muted(&self, id: SoundId) -> bool {
        self.slots.get(id).is_some_and(SoundHandle::is_muted)
    }

    /// Playback state, accounting for one-shot sounds that ran out.
    pub fn state(&self, id: SoundId) -> Option<PlaybackState> {
        self.slots
            .get(id)
            .map(|handle| observed_state(&self.backend, handle))
    }

    pub fn handle(&self, id: SoundId) -> Option<&SoundHandle> {
        self.slots.get(id)
    }

    /// Ids of every live sound in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = SoundId> + '_ {
        self.slots.ids()
    }

    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn install_codec(&mut self, format: &str, codec: Box<dyn Codec>) {
        self.log
            .debug(format_args!("Installing codec for '{format}'"));
        self.backend.install_codec(format, codec);
    }

    pub fn codec_count(&self) -> usize {
        self.backend.codec_count()
    }

    pub fn has_custom_midi_codec(&self) -> bool {
        self.backend.has_custom_midi_codec()
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// State of `handle` as the backend sees it.
fn observed_state<B: Backend>(backend: &B, handle: &SoundHandle) -> PlaybackState {
    if backend.playing(handle.source()) {
        PlaybackState::Playing
    } else if handle.state().is_playing() {
        // One-shot sound ran off its end
        PlaybackState::Stopped
    } else {
        handle.state()
    }
}

fn report(log: &SoundLog, action: &str, handle: &SoundHandle, error: &Error) {
    log.error(format_args!(
        "Backend failed to {action} sound {} ('{}'): {error}",
        handle.id(),
        handle.source()
    ));
}
