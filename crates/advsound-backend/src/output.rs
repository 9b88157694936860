//! Audio output using cpal.

use advsound_core::{Error, Result};
use cpal::{
    traits::{DeviceTrait, HostTrait},
    Device, SampleFormat, Stream, StreamConfig,
};
use tracing::{debug, error, info};

/// Negotiated format of an output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
        }
    }
}

/// An opened output device ready to build streams on.
pub struct OutputDevice {
    device: Device,
    stream_config: StreamConfig,
    sample_format: SampleFormat,
    config: OutputConfig,
    name: String,
}

impl OutputDevice {
    /// Open the host's default output device.
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Output("No output device found".to_string()))?;

        Self::with_device(device)
    }

    /// Use a specific device.
    pub fn with_device(device: Device) -> Result<Self> {
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::Output(format!("Failed to get output config: {e}")))?;

        debug!("Supported output config: {:?}", supported_config);

        let sample_format = supported_config.sample_format();
        let stream_config: StreamConfig = supported_config.into();
        let config = OutputConfig {
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        };

        info!(
            "Using audio output device: {name} ({}Hz, {} channels, {:?})",
            config.sample_rate, config.channels, sample_format
        );

        Ok(Self {
            device,
            stream_config,
            sample_format,
            config,
            name,
        })
    }

    pub const fn config(&self) -> OutputConfig {
        self.config
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build an output stream fed by `render`.
    ///
    /// `render` receives a zeroed interleaved `f32` buffer to fill. The
    /// stream is not started.
    pub fn build_stream<F>(&self, render: F) -> Result<Stream>
    where
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        match self.sample_format {
            SampleFormat::F32 => self.build_typed::<f32, F>(render),
            SampleFormat::I16 => self.build_typed::<i16, F>(render),
            SampleFormat::U16 => self.build_typed::<u16, F>(render),
            other => Err(Error::Output(format!(
                "Unsupported sample format: {other:?}"
            ))),
        }
    }

    fn build_typed<T, F>(&self, mut render: F) -> Result<Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        let err_fn = |err| {
            error!("Audio stream error: {err}");
        };

        let mut scratch: Vec<f32> = Vec::new();

        self.device
            .build_output_stream(
                &self.stream_config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    scratch.clear();
                    scratch.resize(data.len(), 0.0);
                    render(&mut scratch);

                    for (sample, value) in data.iter_mut().zip(&scratch) {
                        // Soft clipping using tanh once several voices sum past full scale
                        let limited = if value.abs() > 0.9 { value.tanh() } else { *value };
                        *sample = T::from_sample(limited);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| Error::Output(format!("Failed to build stream: {e}")))
    }
}
