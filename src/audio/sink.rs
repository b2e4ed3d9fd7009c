//! Playback sinks. Each `play` is fire-and-forget; clips may overlap.

use anyhow::Result;

use super::decoder::AudioBuffer;

pub trait AudioSink: Send + Sync {
    fn play(&self, buffer: &AudioBuffer) -> Result<()>;
}

/// Sink used when no audio device is compiled in; only logs.
#[derive(Debug, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&self, buffer: &AudioBuffer) -> Result<()> {
        log::info!(
            "(silent) would play {}ms at {}Hz/{}ch",
            buffer.duration_ms(),
            buffer.sample_rate,
            buffer.channels,
        );
        Ok(())
    }
}

#[cfg(feature = "alsa")]
pub use alsa_sink::AlsaSink;

#[cfg(feature = "alsa")]
mod alsa_sink {
    use std::thread;

    use anyhow::Result;

    use super::AudioSink;
    use crate::audio::alsa_device;
    use crate::audio::decoder::AudioBuffer;

    /// Plays each clip on its own OS thread so the event loop never blocks on ALSA.
    ///
    /// The device is always opened with the configured channel count; clips
    /// are remixed to whatever layout the hardware negotiated.
    pub struct AlsaSink {
        device: String,
        channels: u32,
    }

    impl AlsaSink {
        pub fn new(device: impl Into<String>, channels: u32) -> Self {
            Self {
                device: device.into(),
                channels,
            }
        }
    }

    impl AudioSink for AlsaSink {
        fn play(&self, buffer: &AudioBuffer) -> Result<()> {
            let device = self.device.clone();
            let channels = self.channels;
            let buffer = buffer.clone();
            thread::Builder::new()
                .name("audio-play".into())
                .spawn(move || {
                    if let Err(e) = play_blocking(&device, channels, &buffer) {
                        log::error!("Playback error: {}", e);
                    }
                })?;
            Ok(())
        }
    }

    fn play_blocking(device: &str, channels: u32, buffer: &AudioBuffer) -> Result<()> {
        let (pcm, params) = alsa_device::open_playback(device, buffer.sample_rate, channels)?;
        let pcm_data = buffer.mix_channels(params.channels);
        let io = pcm.io_i16()?;

        // Write decoded PCM to ALSA with retry loop to handle
        // short writes and XRUN recovery without losing frames.
        let channels = params.channels as usize;
        if channels == 0 {
            anyhow::bail!("Device {} negotiated zero channels", device);
        }
        let total_frames = pcm_data.len() / channels;
        let mut frames_written = 0;
        let mut retry_count = 0u32;

        while frames_written < total_frames {
            let offset = frames_written * channels;
            match io.writei(&pcm_data[offset..]) {
                Ok(n) => {
                    frames_written += n;
                    retry_count = 0;
                }
                Err(e) => {
                    log::warn!("ALSA XRUN or error: {}, recovering...", e);
                    retry_count += 1;

                    // 触发 ALSA 硬件恢复状态机
                    pcm.prepare()?;

                    // 熔断器：持续失败时丢弃剩余帧
                    if retry_count >= 3 {
                        log::error!(
                            "Max recovery retries ({}) reached. Dropping {} unwritten frames.",
                            retry_count,
                            total_frames - frames_written
                        );
                        break;
                    }
                }
            }
        }

        pcm.drain()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every clip handed to it.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub played: Mutex<Vec<AudioBuffer>>,
    }

    impl RecordingSink {
        pub fn count(&self) -> usize {
            self.played.lock().unwrap().len()
        }
    }

    impl AudioSink for RecordingSink {
        fn play(&self, buffer: &AudioBuffer) -> Result<()> {
            self.played.lock().unwrap().push(buffer.clone());
            Ok(())
        }
    }

    #[test]
    fn silent_sink_accepts_anything() {
        let buffer = AudioBuffer {
            sample_rate: 0,
            channels: 0,
            samples: Vec::new().into(),
        };
        assert!(SilentSink.play(&buffer).is_ok());
    }
}
