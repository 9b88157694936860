//! Test doubles: a recording backend and a log sink.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::Arc;

use advsound_backend::{Backend, Codec, CodecRegistry, StreamingSource};
use advsound_core::{Error, Position, Result, SoundResource};
use parking_lot::Mutex;
use tracing::{Dispatch, Level};

/// State of one source inside [`FakeBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct FakeSource {
    pub spec: StreamingSource,
    pub loaded: bool,
    pub playing: bool,
    pub volume: f32,
    pub position: Option<Position>,
    /// Loop flag of the current background-music run.
    pub background: Option<bool>,
}

/// Backend that keeps everything in memory and records each call.
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub initialized: bool,
    pub refuse_init: bool,
    /// Filenames whose load fails with a decode error.
    pub corrupt: BTreeSet<String>,
    pub sources: BTreeMap<String, FakeSource>,
    pub calls: Vec<String>,
    pub cleanups: usize,
    pub(crate) codecs: CodecRegistry,
}

impl FakeBackend {
    pub fn source(&self, name: &str) -> &FakeSource {
        &self.sources[name]
    }

    /// Simulate a one-shot sound reaching its end.
    pub fn finish(&mut self, name: &str) {
        if let Some(source) = self.sources.get_mut(name) {
            source.playing = false;
        }
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls
            .iter()
            .filter(|recorded| recorded.split(' ').next() == Some(call))
            .count()
    }

    fn record(&mut self, call: &str, name: &str) {
        self.calls.push(format!("{call} {name}"));
    }

    fn source_mut(&mut self, name: &str) -> Result<&mut FakeSource> {
        self.sources
            .get_mut(name)
            .ok_or_else(|| Error::UnknownSource(name.to_string()))
    }
}

impl Backend for FakeBackend {
    fn label(&self) -> &'static str {
        "fake"
    }

    fn initialize(&mut self) -> Result<()> {
        self.record("initialize", "");
        if self.refuse_init {
            return Err(Error::Output("No output device found".to_string()));
        }
        self.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn new_streaming_source(&mut self, source: StreamingSource) -> Result<()> {
        self.record("new_streaming_source", &source.name);
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        self.sources.insert(
            source.name.clone(),
            FakeSource {
                spec: source,
                loaded: false,
                playing: false,
                volume: 1.0,
                position: None,
                background: None,
            },
        );
        Ok(())
    }

    fn load(&mut self, resource: &SoundResource, name: &str) -> Result<()> {
        self.record("load", name);
        if self.corrupt.contains(&resource.filename) {
            return Err(Error::Decode(format!("'{}' is corrupt", resource.filename)));
        }
        self.source_mut(name)?.loaded = true;
        Ok(())
    }

    fn set_position(&mut self, name: &str, position: Position) -> Result<()> {
        self.record("set_position", name);
        self.source_mut(name)?.position = Some(position);
        Ok(())
    }

    fn play(&mut self, name: &str) -> Result<()> {
        self.record("play", name);
        self.source_mut(name)?.playing = true;
        Ok(())
    }

    fn background_music(&mut self, name: &str, looped: bool) -> Result<()> {
        self.record("background_music", name);
        let source = self.source_mut(name)?;
        source.background = Some(looped);
        source.playing = true;
        Ok(())
    }

    fn pause(&mut self, name: &str) -> Result<()> {
        self.record("pause", name);
        self.source_mut(name)?.playing = false;
        Ok(())
    }

    fn stop(&mut self, name: &str) -> Result<()> {
        self.record("stop", name);
        let source = self.source_mut(name)?;
        source.playing = false;
        source.background = None;
        Ok(())
    }

    fn dequeue(&mut self, source: &str, _sound: &str) {
        self.record("dequeue", source);
        self.sources.remove(source);
    }

    fn playing(&self, name: &str) -> bool {
        self.sources.get(name).is_some_and(|source| source.playing)
    }

    fn volume(&self, name: &str) -> f32 {
        self.sources.get(name).map_or(0.0, |source| source.volume)
    }

    fn set_volume(&mut self, name: &str, volume: f32) -> Result<()> {
        self.record("set_volume", name);
        self.source_mut(name)?.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn cleanup(&mut self) {
        self.record("cleanup", "");
        self.sources.clear();
        self.initialized = false;
        self.cleanups += 1;
    }

    fn install_codec(&mut self, format: &str, codec: Box<dyn Codec>) {
        self.codecs.install(format, codec);
    }

    fn codec_count(&self) -> usize {
        self.codecs.installed()
    }

    fn has_custom_midi_codec(&self) -> bool {
        self.codecs.has_midi()
    }
}

/// Formatted log output collected in memory.
#[derive(Debug, Clone, Default)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    /// A dispatch writing INFO and above into this buffer.
    pub fn dispatch(&self) -> Dispatch {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        Dispatch::new(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
