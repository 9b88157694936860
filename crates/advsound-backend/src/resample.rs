//! Converting decoded sounds to the output's rate and channel layout.

use advsound_core::{Error, PcmBuffer, Result};
use rubato::{FftFixedIn, Resampler};
use tracing::debug;

/// Requested input chunk size; rubato may round it up.
const CHUNK_FRAMES: usize = 1024;

/// Sub-chunks per FFT chunk.
const SUB_CHUNKS: usize = 2;

/// Remix `pcm` to `channels` and resample it to `sample_rate`.
pub fn convert(pcm: &PcmBuffer, sample_rate: u32, channels: u16) -> Result<PcmBuffer> {
    let remixed = pcm.remix(channels);
    if remixed.sample_rate == sample_rate {
        return Ok(remixed);
    }

    let samples = resample(&remixed, sample_rate)?;
    Ok(PcmBuffer::new(sample_rate, remixed.channels, samples))
}

fn resample(pcm: &PcmBuffer, output_rate: u32) -> Result<Vec<f32>> {
    let channels = usize::from(pcm.channels);
    if channels == 0 || pcm.sample_rate == 0 || output_rate == 0 {
        return Err(Error::Decode(format!(
            "Cannot resample {channels} channels from {}Hz to {output_rate}Hz",
            pcm.sample_rate
        )));
    }

    let mut resampler = FftFixedIn::<f32>::new(
        pcm.sample_rate as usize,
        output_rate as usize,
        CHUNK_FRAMES,
        SUB_CHUNKS,
        channels,
    )
    .map_err(|e| Error::Decode(format!("Failed to create resampler: {e}")))?;

    let planes = deinterleave(&pcm.samples, channels);
    let frames = pcm.frames();
    let delay = resampler.output_delay();
    let wanted = (frames as u64 * u64::from(output_rate) / u64::from(pcm.sample_rate)) as usize;
    let mut output = vec![Vec::with_capacity(delay + wanted); channels];

    let mut start = 0;
    while start < frames {
        let end = (start + resampler.input_frames_next()).min(frames);
        let chunk: Vec<&[f32]> = planes.iter().map(|plane| &plane[start..end]).collect();
        let resampled = resampler
            .process_partial(Some(chunk.as_slice()), None)
            .map_err(|e| Error::Decode(format!("Resample failed: {e}")))?;
        append(&mut output, resampled);
        start = end;
    }

    // Push silence through until the delayed tail comes out
    while output[0].len() < delay + wanted {
        let resampled = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| Error::Decode(format!("Resample failed: {e}")))?;
        append(&mut output, resampled);
    }

    debug!(
        "Resampled {frames} frames {}Hz -> {output_rate}Hz ({wanted} frames, delay {delay})",
        pcm.sample_rate
    );
    Ok(interleave(&output, delay, wanted))
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let mut planes = vec![Vec::with_capacity(samples.len() / channels); channels];
    for frame in samples.chunks_exact(channels) {
        for (plane, sample) in planes.iter_mut().zip(frame) {
            plane.push(*sample);
        }
    }
    planes
}

fn append(output: &mut [Vec<f32>], resampled: Vec<Vec<f32>>) {
    for (plane, chunk) in output.iter_mut().zip(resampled) {
        plane.extend(chunk);
    }
}

/// Interleave `frames` frames starting at frame `skip`.
fn interleave(planes: &[Vec<f32>], skip: usize, frames: usize) -> Vec<f32> {
    let mut samples = Vec::with_capacity(frames * planes.len());
    for frame in skip..skip + frames {
        samples.extend(planes.iter().map(|plane| plane[frame]));
    }
    samples
}
