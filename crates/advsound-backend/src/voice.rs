//! Per-source playback state and sample rendering.

use std::sync::Arc;

use advsound_core::{Attenuation, PcmBuffer, Position};

use crate::backend::StreamingSource;

/// A playing (or playable) source: decoded audio plus cursor and gains.
///
/// Audio must already be in the output's rate and channel layout.
#[derive(Debug, Clone)]
pub struct Voice {
    pcm: Option<Arc<PcmBuffer>>,
    /// Next frame to render.
    cursor: usize,
    looped: bool,
    /// Loop flag the source was created with.
    queued_looped: bool,
    /// Background music ignores position until stopped.
    background: bool,
    playing: bool,
    volume: f32,
    attenuation: Attenuation,
    rolloff: f32,
    position: Position,
    spatial_gain: f32,
}

impl Voice {
    pub fn new(source: &StreamingSource) -> Self {
        let mut voice = Self {
            pcm: None,
            cursor: 0,
            looped: source.looped,
            queued_looped: source.looped,
            background: false,
            playing: false,
            volume: 1.0,
            attenuation: source.attenuation,
            rolloff: source.rolloff,
            position: Position::ORIGIN,
            spatial_gain: 1.0,
        };
        voice.set_position(Position::ORIGIN);
        voice
    }

    /// Attach decoded audio, rewinding to the start.
    pub fn set_pcm(&mut self, pcm: Arc<PcmBuffer>) {
        self.pcm = Some(pcm);
        self.cursor = 0;
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Start as background music at full spatial gain.
    pub fn play_background(&mut self, looped: bool) {
        self.background = true;
        self.looped = looped;
        self.spatial_gain = 1.0;
        self.playing = true;
    }

    pub const fn is_background(&self) -> bool {
        self.background
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Stop, rewind and return from background music to positional play.
    pub fn stop(&mut self) {
        self.playing = false;
        self.cursor = 0;
        if self.background {
            self.background = false;
            self.looped = self.queued_looped;
            self.set_position(self.position);
        }
    }

    pub const fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        if !self.background {
            self.spatial_gain = self.attenuation.gain(self.rolloff, position);
        }
    }

    /// Mix this voice into `out` (interleaved, `channels` wide), adding to
    /// what is already there. Returns the number of frames rendered.
    ///
    /// A non-looping voice that reaches the end stops and rewinds.
    pub fn render(&mut self, out: &mut [f32], channels: usize) -> usize {
        let Some(pcm) = self.pcm.as_ref() else {
            return 0;
        };
        let frames = pcm.frames();
        let src_channels = usize::from(pcm.channels);
        if !self.playing || frames == 0 || channels == 0 {
            return 0;
        }

        let gain = self.volume * self.spatial_gain;
        let shared = src_channels.min(channels);
        let mut rendered = 0;

        for frame in out.chunks_exact_mut(channels) {
            let start = self.cursor * src_channels;
            let source = &pcm.samples[start..start + src_channels];
            for (sample, input) in frame.iter_mut().zip(&source[..shared]) {
                *sample += input * gain;
            }
            rendered += 1;

            self.cursor += 1;
            if self.cursor >= frames {
                self.cursor = 0;
                if !self.looped {
                    self.playing = false;
                    break;
                }
            }
        }

        rendered
    }
}
