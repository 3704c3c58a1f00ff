//! Decoder boundary: uploaded bytes in, mono `Signal` out
//!
//! Codec work is delegated to symphonia. Any probe or packet failure is
//! reported as `AnalysisError::Decode` so one bad upload never takes down
//! the batch.

use super::signal::Signal;
use crate::error::{AnalysisError, Result};
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
    formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

/// An uploaded audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Lower-case file extension, used as a format hint
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// Turns an uploaded byte stream into a mono signal
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, file: &UploadedFile) -> Result<Signal>;
}

/// Decoder backed by symphonia (WAV, MP3, FLAC, OGG/Vorbis)
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, file: &UploadedFile) -> Result<Signal> {
        let source = Cursor::new(file.bytes.clone());
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = file.extension() {
            hint.with_extension(&ext);
        }

        let probed = get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| AnalysisError::Decode(format!("{}: failed to probe: {}", file.name, e)))?;
        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AnalysisError::Decode(format!("{}: no default track", file.name)))?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AnalysisError::Decode(format!("{}: missing sample rate", file.name)))?;

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AnalysisError::Decode(format!("{}: unsupported codec: {}", file.name, e)))?;

        let mut interleaved: Vec<f64> = Vec::new();
        let mut channels = 0usize;
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(err) => {
                    return Err(AnalysisError::Decode(format!(
                        "{}: failed to read packet: {}",
                        file.name, err
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(audio_buffer) => {
                    let spec = *audio_buffer.spec();
                    let packet_channels = spec.channels.count();
                    if packet_channels == 0 {
                        continue;
                    }
                    if channels == 0 {
                        channels = packet_channels;
                    } else if channels != packet_channels {
                        return Err(AnalysisError::Decode(format!(
                            "{}: channel count changed from {} to {}",
                            file.name, channels, packet_channels
                        )));
                    }

                    let mut sample_buffer =
                        SampleBuffer::<f32>::new(audio_buffer.capacity() as u64, spec);
                    sample_buffer.copy_interleaved_ref(audio_buffer);
                    interleaved.extend(sample_buffer.samples().iter().map(|&s| s as f64));
                }
                // Corrupt packet: skip it, the stream can recover
                Err(SymphoniaError::DecodeError(err)) => {
                    skipped_packets += 1;
                    log::warn!("{}: skipping undecodable packet: {}", file.name, err);
                }
                Err(err) => {
                    return Err(AnalysisError::Decode(format!(
                        "{}: failed to decode packet: {}",
                        file.name, err
                    )));
                }
            }
        }

        if interleaved.is_empty() || channels == 0 {
            return Err(AnalysisError::Decode(format!(
                "{}: audio stream produced no samples",
                file.name
            )));
        }

        log::debug!(
            "Decoded {}: {} frames, {} channel(s) at {} Hz ({} packets skipped)",
            file.name,
            interleaved.len() / channels,
            channels,
            sample_rate,
            skipped_packets
        );

        Signal::from_interleaved(&interleaved, channels, sample_rate)
    }
}
