//! Codec registration and dispatch.

use std::collections::HashMap;
use std::fmt;

use advsound_core::{PcmBuffer, Result};
use tracing::{debug, info};

use crate::decode::decode_all;

/// Format tags that identify MIDI sequences.
const MIDI_FORMATS: &[&str] = &["mid", "midi"];

/// A decoder for one audio format.
pub trait Codec {
    /// Decode a complete file into interleaved PCM.
    fn decode(&self, data: &[u8]) -> Result<PcmBuffer>;
}

/// Built-in codec backed by symphonia's probe, covering every format
/// symphonia ships.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaCodec {
    hint: Option<String>,
}

impl SymphoniaCodec {
    pub fn with_hint(extension: impl Into<String>) -> Self {
        Self {
            hint: Some(extension.into()),
        }
    }
}

impl Codec for SymphoniaCodec {
    fn decode(&self, data: &[u8]) -> Result<PcmBuffer> {
        decode_all(data.to_vec(), self.hint.as_deref())
    }
}

/// Codecs installed on a backend, keyed by lowercase format tag.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Box<dyn Codec>>,
    installed: usize,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` for `format`, replacing any earlier one.
    pub fn install(&mut self, format: &str, codec: Box<dyn Codec>) {
        let format = normalize(format);
        self.installed += 1;
        if self.codecs.insert(format.clone(), codec).is_some() {
            info!("Replaced codec for '{format}'");
        } else {
            info!("Installed codec for '{format}'");
        }
    }

    /// Number of install calls made so far.
    pub const fn installed(&self) -> usize {
        self.installed
    }

    pub fn has(&self, format: &str) -> bool {
        self.codecs.contains_key(&normalize(format))
    }

    pub fn has_midi(&self) -> bool {
        MIDI_FORMATS.iter().any(|format| self.has(format))
    }

    /// Decode with the codec installed for `format`, falling back to symphonia.
    pub fn decode(&self, format: Option<&str>, data: &[u8]) -> Result<PcmBuffer> {
        let format = format.map(normalize);
        if let Some(codec) = format.as_ref().and_then(|f| self.codecs.get(f)) {
            debug!("Decoding {} bytes with installed codec {:?}", data.len(), format);
            return codec.decode(data);
        }

        let builtin = format.map_or_else(SymphoniaCodec::default, SymphoniaCodec::with_hint);
        builtin.decode(data)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.codecs.keys().collect();
        formats.sort();
        f.debug_struct("CodecRegistry")
            .field("formats", &formats)
            .field("installed", &self.installed)
            .finish()
    }
}

fn normalize(format: &str) -> String {
    format.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

    use super::*;
    use advsound_core::Error;

    /// Produces a fixed buffer regardless of input.
    struct ConstantCodec(f32);

    impl Codec for ConstantCodec {
        fn decode(&self, data: &[u8]) -> Result<PcmBuffer> {
            Ok(PcmBuffer::new(8000, 1, vec![self.0; data.len()]))
        }
    }

    #[test]
    fn test_install_counts_every_call() {
        let mut codecs = CodecRegistry::new();
        codecs.install("xm", Box::new(ConstantCodec(0.1)));
        codecs.install(".XM", Box::new(ConstantCodec(0.2)));
        assert_eq!(codecs.installed(), 2);
        assert!(codecs.has("xm"));
        assert!(!codecs.has("mod"));
    }

    #[test]
    fn test_installed_codec_wins() {
        let mut codecs = CodecRegistry::new();
        codecs.install("Raw", Box::new(ConstantCodec(0.5)));

        let pcm = codecs.decode(Some("raw"), &[0, 0, 0]).unwrap();
        assert_eq!(pcm.samples, vec![0.5; 3]);
    }

    #[test]
    fn test_fallback_rejects_garbage() {
        let codecs = CodecRegistry::new();
        let result = codecs.decode(Some("wav"), b"definitely not audio");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_midi_detection() {
        let mut codecs = CodecRegistry::new();
        assert!(!codecs.has_midi());
        codecs.install("MID", Box::new(ConstantCodec(0.0)));
        assert!(codecs.has_midi());
    }
}
