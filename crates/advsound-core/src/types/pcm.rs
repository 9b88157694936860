//! Decoded audio.

/// Interleaved `f32` PCM samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PcmBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

impl PcmBuffer {
    pub const fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    /// Number of frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / usize::from(self.channels)
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Convert to `channels` output channels.
    ///
    /// Mono is duplicated into every output channel; a multichannel source
    /// folded to mono is averaged; otherwise channels are copied by index and
    /// missing ones are silent.
    pub fn remix(&self, channels: u16) -> Self {
        if channels == self.channels || self.channels == 0 || channels == 0 {
            return self.clone();
        }

        let src = usize::from(self.channels);
        let dst = usize::from(channels);
        let mut samples = Vec::with_capacity(self.frames() * dst);

        for frame in self.samples.chunks_exact(src) {
            if src == 1 {
                samples.extend(std::iter::repeat_n(frame[0], dst));
            } else if dst == 1 {
                samples.push(frame.iter().sum::<f32>() / src as f32);
            } else {
                samples.extend((0..dst).map(|ch| frame.get(ch).copied().unwrap_or(0.0)));
            }
        }

        Self::new(self.sample_rate, channels, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_and_duration() {
        let pcm = PcmBuffer::new(4, 2, vec![0.0; 16]);
        assert_eq!(pcm.frames(), 8);
        assert!((pcm.duration_secs() - 2.0).abs() < f64::EPSILON);
        assert!(PcmBuffer::default().is_empty());
    }

    #[test]
    fn test_remix_mono_to_stereo() {
        let pcm = PcmBuffer::new(48000, 1, vec![0.1, 0.2]);
        assert_eq!(pcm.remix(2).samples, vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_remix_stereo_to_mono() {
        let pcm = PcmBuffer::new(48000, 2, vec![0.2, 0.4, 1.0, 0.0]);
        let mono = pcm.remix(1);
        assert_eq!(mono.channels, 1);
        assert!((mono.samples[0] - 0.3).abs() < 1e-6);
        assert!((mono.samples[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_remix_stereo_to_quad() {
        let pcm = PcmBuffer::new(48000, 2, vec![0.5, -0.5]);
        assert_eq!(pcm.remix(4).samples, vec![0.5, -0.5, 0.0, 0.0]);
    }
}
