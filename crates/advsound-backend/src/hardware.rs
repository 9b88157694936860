//! Hardware mixer: each voice gets its own device stream and the device (or
//! the OS mixer behind it) combines them.
//!
//! Hardware voices are a scarce resource, so the pool is bounded. A priority
//! source may take the voice of the oldest non-priority source when the pool
//! is full; a non-priority source is refused instead. An evicted source keeps
//! its audio and settings and stays addressable. It reports not playing and
//! asks the pool for a stream again the next time it is played.

use std::collections::BTreeMap;
use std::sync::Arc;

use advsound_core::{Error, Position, Result, SoundResource};
use cpal::{traits::StreamTrait, Stream};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::backend::{Backend, StreamingSource};
use crate::bank::SoundBank;
use crate::codec::Codec;
use crate::output::OutputDevice;
use crate::voice::Voice;

/// Default size of the voice pool.
pub const DEFAULT_MAX_VOICES: usize = 32;

/// One voice and the stream that plays it.
struct HardwareVoice {
    voice: Arc<Mutex<Voice>>,
    /// Present while the source holds a pool voice.
    stream: Option<Stream>,
    /// Lost its pool voice to a priority source.
    evicted: bool,
    priority: bool,
    /// Creation order, used to pick eviction victims.
    serial: u64,
}

impl HardwareVoice {
    fn start(&self) -> Result<()> {
        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|e| Error::Output(format!("Failed to start voice stream: {e}")))?;
        }
        Ok(())
    }

    fn evict(&mut self) {
        self.voice.lock().stop();
        self.park();
        self.stream = None;
        self.evicted = true;
    }

    fn park(&self) {
        // Some hosts cannot pause; the voice renders silence either way.
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                debug!("Voice stream did not pause: {e}");
            }
        }
    }
}

/// Backend that gives every source its own hardware voice.
pub struct HardwareMixer {
    bank: SoundBank,
    device: Option<OutputDevice>,
    voices: BTreeMap<String, HardwareVoice>,
    max_voices: usize,
    next_serial: u64,
}

impl HardwareMixer {
    pub fn new() -> Self {
        Self::with_max_voices(DEFAULT_MAX_VOICES)
    }

    /// Create a mixer with a custom voice pool size (at least one voice).
    pub fn with_max_voices(max_voices: usize) -> Self {
        Self {
            bank: SoundBank::new(),
            device: None,
            voices: BTreeMap::new(),
            max_voices: max_voices.max(1),
            next_serial: 0,
        }
    }

    pub const fn max_voices(&self) -> usize {
        self.max_voices
    }

    /// Number of pool voices currently held by sources.
    pub fn voice_count(&self) -> usize {
        self.voices.values().filter(|hardware| !hardware.evicted).count()
    }

    fn require_device(&self) -> Result<&OutputDevice> {
        self.device.as_ref().ok_or(Error::NotInitialized)
    }

    fn voice(&self, name: &str) -> Result<&HardwareVoice> {
        self.voices
            .get(name)
            .ok_or_else(|| Error::UnknownSource(name.to_string()))
    }

    /// Make room for `name` in the pool, evicting if it has priority.
    fn reserve_voice(&mut self, name: &str, priority: bool) -> Result<()> {
        let holds_voice = self
            .voices
            .get(name)
            .is_some_and(|hardware| !hardware.evicted);
        if holds_voice || self.voice_count() < self.max_voices {
            return Ok(());
        }

        let victim = if priority {
            pick_victim(&self.voices)
        } else {
            None
        };

        let Some(victim) = victim else {
            return Err(Error::VoicesExhausted {
                max: self.max_voices,
            });
        };

        warn!("Voice pool full, evicting '{victim}' for priority source '{name}'");
        if let Some(evicted) = self.voices.get_mut(&victim) {
            evicted.evict();
        }
        Ok(())
    }

    fn open_stream(&self, voice: &Arc<Mutex<Voice>>) -> Result<Stream> {
        let device = self.require_device()?;
        let channels = usize::from(device.config().channels);
        let render_voice = Arc::clone(voice);
        device.build_stream(move |out| {
            render_voice.lock().render(out, channels);
        })
    }

    /// Give an evicted source a pool voice again.
    fn reacquire(&mut self, name: &str) -> Result<()> {
        let hardware = self.voice(name)?;
        if !hardware.evicted {
            return Ok(());
        }
        let (priority, voice) = (hardware.priority, Arc::clone(&hardware.voice));

        self.reserve_voice(name, priority)?;
        let stream = self.open_stream(&voice)?;
        if let Some(hardware) = self.voices.get_mut(name) {
            hardware.stream = Some(stream);
            hardware.evicted = false;
            hardware.serial = self.next_serial;
            self.next_serial += 1;
        }
        debug!("Voice '{name}' reacquired");
        Ok(())
    }
}

impl Default for HardwareMixer {
    fn default() -> Self {
        Self::new()
    }
}

/// Oldest non-priority voice.
fn pick_victim(voices: &BTreeMap<String, HardwareVoice>) -> Option<String> {
    voices
        .iter()
        .filter(|(_, voice)| !voice.priority && !voice.evicted)
        .min_by_key(|(_, voice)| voice.serial)
        .map(|(name, _)| name.clone())
}

impl Backend for HardwareMixer {
    fn label(&self) -> &'static str {
        "hardware"
    }

    fn initialize(&mut self) -> Result<()> {
        if self.device.is_some() {
            debug!("Hardware mixer already initialized");
            return Ok(());
        }

        let device = OutputDevice::open_default().map_err(|e| Error::BackendInit(e.to_string()))?;
        info!(
            "Hardware mixer using '{}' with {} voices",
            device.name(),
            self.max_voices
        );
        self.device = Some(device);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.device.is_some()
    }

    fn new_streaming_source(&mut self, source: StreamingSource) -> Result<()> {
        self.require_device()?;
        self.reserve_voice(&source.name, source.priority)?;

        let mut voice = Voice::new(&source);
        if let Some(pcm) = self.bank.get(&source.name) {
            voice.set_pcm(pcm);
        }
        let voice = Arc::new(Mutex::new(voice));
        let stream = self.open_stream(&voice)?;

        let serial = self.next_serial;
        self.next_serial += 1;

        let previous = self.voices.insert(
            source.name.clone(),
            HardwareVoice {
                voice,
                stream: Some(stream),
                evicted: false,
                priority: source.priority,
                serial,
            },
        );
        if previous.is_some() {
            warn!("Replaced existing source '{}'", source.name);
        }

        debug!(
            "Created voice '{}' (priority={}, looped={}, {}/{} in use)",
            source.name,
            source.priority,
            source.looped,
            self.voice_count(),
            self.max_voices
        );
        Ok(())
    }

    fn load(&mut self, resource: &SoundResource, name: &str) -> Result<()> {
        let config = self.require_device()?.config();
        let pcm = self.bank.load(resource, name, config)?;

        if let Some(hardware) = self.voices.get(name) {
            hardware.voice.lock().set_pcm(pcm);
        }
        Ok(())
    }

    fn set_position(&mut self, name: &str, position: Position) -> Result<()> {
        self.voice(name)?.voice.lock().set_position(position);
        Ok(())
    }

    fn play(&mut self, name: &str) -> Result<()> {
        self.reacquire(name)?;
        let hardware = self.voice(name)?;
        hardware.voice.lock().play();
        hardware.start()
    }

    fn background_music(&mut self, name: &str, looped: bool) -> Result<()> {
        self.reacquire(name)?;
        let hardware = self.voice(name)?;
        hardware.voice.lock().play_background(looped);
        hardware.start()?;
        debug!("Playing '{name}' as background music (looped={looped})");
        Ok(())
    }

    fn pause(&mut self, name: &str) -> Result<()> {
        let hardware = self.voice(name)?;
        hardware.voice.lock().pause();
        hardware.park();
        Ok(())
    }

    fn stop(&mut self, name: &str) -> Result<()> {
        let hardware = self.voice(name)?;
        hardware.voice.lock().stop();
        hardware.park();
        Ok(())
    }

    fn dequeue(&mut self, source: &str, sound: &str) {
        if let Some(hardware) = self.voices.remove(source) {
            hardware.voice.lock().stop();
            hardware.park();
        }
        self.bank.unload(sound);
        debug!(
            "Dequeued '{source}', {}/{} voices in use",
            self.voice_count(),
            self.max_voices
        );
    }

    fn playing(&self, name: &str) -> bool {
        self.voices
            .get(name)
            .is_some_and(|hardware| hardware.voice.lock().is_playing())
    }

    fn volume(&self, name: &str) -> f32 {
        self.voices
            .get(name)
            .map_or(0.0, |hardware| hardware.voice.lock().volume())
    }

    fn set_volume(&mut self, name: &str, volume: f32) -> Result<()> {
        self.voice(name)?.voice.lock().set_volume(volume);
        Ok(())
    }

    fn cleanup(&mut self) {
        for hardware in self.voices.values() {
            hardware.voice.lock().stop();
            hardware.park();
        }
        self.voices.clear();
        self.bank.clear();
        if self.device.take().is_some() {
            info!("Hardware mixer released its device");
        }
    }

    fn install_codec(&mut self, format: &str, codec: Box<dyn Codec>) {
        self.bank.install_codec(format, codec);
    }

    fn codec_count(&self) -> usize {
        self.bank.codecs().installed()
    }

    fn has_custom_midi_codec(&self) -> bool {
        self.bank.codecs().has_midi()
    }
}
