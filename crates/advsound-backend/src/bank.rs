//! Decoded sound storage shared by the mixers.

use std::collections::HashMap;
use std::sync::Arc;

use advsound_core::{Error, PcmBuffer, Result, SoundResource};
use tracing::debug;

use crate::codec::{Codec, CodecRegistry};
use crate::fetch::fetch;
use crate::output::OutputConfig;
use crate::resample::convert;

/// Loaded sounds keyed by name, converted to the output format.
#[derive(Debug, Default)]
pub struct SoundBank {
    codecs: CodecRegistry,
    sounds: HashMap<String, Arc<PcmBuffer>>,
}

impl SoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch, decode and convert `resource`, storing it under `name`.
    pub fn load(
        &mut self,
        resource: &SoundResource,
        name: &str,
        output: OutputConfig,
    ) -> Result<Arc<PcmBuffer>> {
        debug!(
            "Loading '{name}' from {} {}",
            if resource.is_local() { "file" } else { "remote" },
            resource.location
        );
        let data = fetch(&resource.location)?;
        let decoded = self.codecs.decode(resource.format.as_deref(), &data)?;
        if decoded.is_empty() {
            return Err(Error::Decode(format!(
                "'{}' contains no audio frames",
                resource.filename
            )));
        }

        let pcm = Arc::new(convert(&decoded, output.sample_rate, output.channels)?);
        debug!(
            "Loaded '{name}': {:.2}s at {}Hz, {} channels",
            pcm.duration_secs(),
            pcm.sample_rate,
            pcm.channels
        );

        self.sounds.insert(name.to_string(), Arc::clone(&pcm));
        Ok(pcm)
    }

    pub fn get(&self, name: &str) -> Option<Arc<PcmBuffer>> {
        self.sounds.get(name).cloned()
    }

    pub fn unload(&mut self, name: &str) -> bool {
        self.sounds.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Drop every loaded sound. Installed codecs are kept.
    pub fn clear(&mut self) {
        self.sounds.clear();
    }

    pub fn install_codec(&mut self, format: &str, codec: Box<dyn Codec>) {
        self.codecs.install(format, codec);
    }

    pub const fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

    use super::*;
    use crate::decode::tests::wav_bytes;

    fn write_wav(dir: &tempfile::TempDir, name: &str, samples: &[i16]) -> SoundResource {
        let path = dir.path().join(name);
        std::fs::write(&path, wav_bytes(48000, 1, samples)).unwrap();
        SoundResource::resolve(path.to_str().unwrap(), name).unwrap()
    }

    #[test]
    fn test_load_converts_to_output_layout() {
        let dir = tempfile::tempdir().unwrap();
        let resource = write_wav(&dir, "click.wav", &[8192; 96]);

        let mut bank = SoundBank::new();
        let pcm = bank
            .load(&resource, "0:click.wav", OutputConfig::default())
            .unwrap();

        assert_eq!(pcm.channels, 2);
        assert_eq!(pcm.sample_rate, 48000);
        assert_eq!(pcm.frames(), 96);
        assert!(bank.get("0:click.wav").is_some());
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.wav");
        let resource = SoundResource::resolve(path.to_str().unwrap(), "nope.wav").unwrap();

        let mut bank = SoundBank::new();
        let result = bank.load(&resource, "0:nope.wav", OutputConfig::default());
        assert!(matches!(result, Err(Error::MalformedResource(_))));
        assert!(bank.is_empty());
    }

    #[test]
    fn test_unload_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let resource = write_wav(&dir, "a.wav", &[0; 8]);

        let mut bank = SoundBank::new();
        bank.load(&resource, "a", OutputConfig::default()).unwrap();
        bank.load(&resource, "b", OutputConfig::default()).unwrap();

        assert!(bank.unload("a"));
        assert!(!bank.unload("a"));
        bank.clear();
        assert!(bank.is_empty());
    }
}
