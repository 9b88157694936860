//! Decoding whole sound files with symphonia.

use std::io::{Cursor, ErrorKind};

use advsound_core::{Error, PcmBuffer, Result};
use symphonia::core::{
    audio::{AudioBufferRef, SampleBuffer, SignalSpec},
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::{MediaSourceStream, MediaSourceStreamOptions},
    meta::MetadataOptions,
    probe::Hint,
};
use tracing::{debug, warn};

/// Decode the first audio track in `data` into one interleaved buffer.
///
/// `extension` guides format probing when the container is known.
pub fn decode_all(data: Vec<u8>, extension: Option<&str>) -> Result<PcmBuffer> {
    let source = Box::new(Cursor::new(data));
    let mss = MediaSourceStream::new(source, MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let format_opts = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };
    let mut format = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &MetadataOptions::default())
        .map_err(|e| Error::Decode(format!("Failed to probe format: {e}")))?
        .format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("No audio tracks found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode(format!("Failed to create decoder: {e}")))?;

    let mut samples = Vec::new();
    let mut scratch: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::Decode(format!("Failed to read packet: {e}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                channels.get_or_insert(spec.channels.count() as u16);
                append_interleaved(&mut scratch, &mut samples, decoded);
            }
            Err(SymphoniaError::DecodeError(e)) => warn!("Skipping corrupt packet: {e}"),
            Err(e) => return Err(Error::Decode(format!("Decode failed: {e}"))),
        }
    }

    let (Some(sample_rate), Some(channels)) = (sample_rate, channels) else {
        return Err(Error::Decode("Stream has no sample format".to_string()));
    };
    if samples.is_empty() {
        return Err(Error::Decode("Stream contains no audio frames".to_string()));
    }

    debug!("Decoded {} samples at {sample_rate}Hz, {channels} channels", samples.len());
    Ok(PcmBuffer::new(sample_rate, channels, samples))
}

/// Copy one decoded packet onto the end of `samples`, growing the scratch
/// buffer when a packet is larger than any before it.
fn append_interleaved(
    scratch: &mut Option<SampleBuffer<f32>>,
    samples: &mut Vec<f32>,
    decoded: AudioBufferRef<'_>,
) {
    let spec = SignalSpec::new(decoded.spec().rate, decoded.spec().channels);
    let too_small = scratch
        .as_ref()
        .map_or(true, |buffer| buffer.capacity() < decoded.capacity());
    if too_small {
        *scratch = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
    }

    if let Some(buffer) = scratch.as_mut() {
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }
}
