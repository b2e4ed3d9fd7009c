//! Whole-file audio decoding into PCM buffers.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// A decoded clip: interleaved i16 PCM, cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: u32,
    pub samples: Arc<[i16]>,
}

impl AudioBuffer {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Interleaved samples remapped to `output_channels`.
    #[cfg_attr(not(feature = "alsa"), allow(dead_code))]
    pub fn mix_channels(&self, output_channels: u32) -> Vec<i16> {
        let input = self.channels as usize;
        let output = output_channels as usize;
        let frames = self.frames();
        if input == 0 || output == 0 {
            return Vec::new();
        }

        if output == input {
            // Same channel count, passthrough
            self.samples[..frames * input].to_vec()
        } else if output == 1 {
            // Multi-channel → mono: average all channels
            self.samples
                .chunks_exact(input)
                .map(|frame| {
                    let sum: i32 = frame.iter().map(|s| *s as i32).sum();
                    (sum / input as i32) as i16
                })
                .collect()
        } else {
            // General channel mapping (wrap channels)
            let mut out = vec![0i16; frames * output];
            for i in 0..frames {
                for c in 0..output {
                    out[i * output + c] = self.samples[i * input + c % input];
                }
            }
            out
        }
    }
}

/// A trait for decoders that turn a complete compressed file into PCM.
///
/// `name` is the resource name the bytes came from; implementations may use
/// its extension as a format hint.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, name: &str, data: Vec<u8>) -> Result<AudioBuffer>;
}

/// Decoder backed by symphonia's default format and codec registries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, name: &str, data: Vec<u8>) -> Result<AudioBuffer> {
        let mut hint = Hint::new();
        if let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());
        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .with_context(|| format!("Unrecognised audio container: {}", name))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| anyhow!("No audio track in {}", name))?;
        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .with_context(|| format!("Unsupported codec in {}", name))?;

        let mut samples: Vec<i16> = Vec::new();
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u32)
            .unwrap_or(0);

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e).with_context(|| format!("Failed to read {}", name)),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channels = spec.channels.count() as u32;
                    let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                // 单个坏包跳过
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping corrupt packet in {}: {}", name, e);
                }
                Err(e) => return Err(e).with_context(|| format!("Failed to decode {}", name)),
            }
        }

        if samples.is_empty() || sample_rate == 0 || channels == 0 {
            bail!("No samples decoded from {}", name);
        }

        Ok(AudioBuffer {
            sample_rate,
            channels,
            samples: samples.into(),
        })
    }
}
