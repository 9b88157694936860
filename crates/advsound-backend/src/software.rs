//! Software mixer: every voice is summed into one output stream.

use std::collections::BTreeMap;
use std::sync::Arc;

use advsound_core::{Error, Position, Result, SoundResource};
use cpal::{traits::StreamTrait, Stream};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::backend::{Backend, StreamingSource};
use crate::bank::SoundBank;
use crate::codec::Codec;
use crate::output::{OutputConfig, OutputDevice};
use crate::voice::Voice;

/// Voices shared between the control thread and the output callback.
type SharedVoices = Arc<Mutex<BTreeMap<String, Voice>>>;

/// Running output stream.
struct MixerOutput {
    /// Keep the stream alive for the lifetime of the mixer output.
    _stream: Stream,
    config: OutputConfig,
}

/// Backend that mixes all sources in software into a single cpal stream.
pub struct SoftwareMixer {
    bank: SoundBank,
    voices: SharedVoices,
    output: Option<MixerOutput>,
}

impl SoftwareMixer {
    pub fn new() -> Self {
        Self {
            bank: SoundBank::new(),
            voices: Arc::new(Mutex::new(BTreeMap::new())),
            output: None,
        }
    }

    /// Format of the running output, if initialized.
    pub fn output_config(&self) -> Option<OutputConfig> {
        self.output.as_ref().map(|output| output.config)
    }

    /// Number of sources currently known to the mixer.
    pub fn source_count(&self) -> usize {
        self.voices.lock().len()
    }

    fn require_output(&self) -> Result<OutputConfig> {
        self.output_config().ok_or(Error::NotInitialized)
    }

    fn with_voice<T>(&self, name: &str, f: impl FnOnce(&mut Voice) -> T) -> Result<T> {
        let mut voices = self.voices.lock();
        voices
            .get_mut(name)
            .map(f)
            .ok_or_else(|| Error::UnknownSource(name.to_string()))
    }
}

impl Default for SoftwareMixer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum every playing voice into `out`.
fn mix(voices: &Mutex<BTreeMap<String, Voice>>, out: &mut [f32], channels: usize) {
    let mut voices = voices.lock();
    for voice in voices.values_mut() {
        voice.render(out, channels);
    }
}

impl Backend for SoftwareMixer {
    fn label(&self) -> &'static str {
        "software"
    }

    fn initialize(&mut self) -> Result<()> {
        if self.output.is_some() {
            debug!("Software mixer already initialized");
            return Ok(());
        }

        let device = OutputDevice::open_default().map_err(|e| Error::BackendInit(e.to_string()))?;
        let config = device.config();
        let channels = usize::from(config.channels);

        let voices = Arc::clone(&self.voices);
        let stream = device
            .build_stream(move |out| mix(&voices, out, channels))
            .map_err(|e| Error::BackendInit(e.to_string()))?;
        stream
            .play()
            .map_err(|e| Error::BackendInit(format!("Failed to start stream: {e}")))?;

        info!("Software mixer running on '{}'", device.name());
        self.output = Some(MixerOutput {
            _stream: stream,
            config,
        });
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.output.is_some()
    }

    fn new_streaming_source(&mut self, source: StreamingSource) -> Result<()> {
        self.require_output()?;

        let mut voice = Voice::new(&source);
        if let Some(pcm) = self.bank.get(&source.name) {
            voice.set_pcm(pcm);
        }

        if self.voices.lock().insert(source.name.clone(), voice).is_some() {
            warn!("Replaced existing source '{}'", source.name);
        }
        debug!(
            "Created source '{}' (priority={}, looped={})",
            source.name, source.priority, source.looped
        );
        Ok(())
    }

    fn load(&mut self, resource: &SoundResource, name: &str) -> Result<()> {
        let config = self.require_output()?;
        let pcm = self.bank.load(resource, name, config)?;

        if let Some(voice) = self.voices.lock().get_mut(name) {
            voice.set_pcm(pcm);
        }
        Ok(())
    }

    fn set_position(&mut self, name: &str, position: Position) -> Result<()> {
        self.with_voice(name, |voice| voice.set_position(position))
    }

    fn play(&mut self, name: &str) -> Result<()> {
        self.with_voice(name, Voice::play)
    }

    fn background_music(&mut self, name: &str, looped: bool) -> Result<()> {
        self.with_voice(name, |voice| voice.play_background(looped))?;
        debug!("Playing '{name}' as background music (looped={looped})");
        Ok(())
    }

    fn pause(&mut self, name: &str) -> Result<()> {
        self.with_voice(name, Voice::pause)
    }

    fn stop(&mut self, name: &str) -> Result<()> {
        self.with_voice(name, Voice::stop)
    }

    fn dequeue(&mut self, source: &str, sound: &str) {
        let removed = self.voices.lock().remove(source).is_some();
        let unloaded = self.bank.unload(sound);
        debug!("Dequeued '{source}' (source={removed}, sound={unloaded})");
    }

    fn playing(&self, name: &str) -> bool {
        self.voices.lock().get(name).is_some_and(Voice::is_playing)
    }

    fn volume(&self, name: &str) -> f32 {
        self.voices.lock().get(name).map_or(0.0, Voice::volume)
    }

    fn set_volume(&mut self, name: &str, volume: f32) -> Result<()> {
        self.with_voice(name, |voice| voice.set_volume(volume))
    }

    fn cleanup(&mut self) {
        self.voices.lock().clear();
        self.bank.clear();
        if self.output.take().is_some() {
            info!("Software mixer stopped");
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
