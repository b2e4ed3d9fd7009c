//! ALSA PCM playback device wrapper.

use alsa::pcm::{Access, Format, HwParams, PCM};
use alsa::{Direction, ValueOr};
use anyhow::{Context, Result};

/// Parameters negotiated with the ALSA hardware.
#[derive(Debug, Clone)]
pub struct AlsaParams {
    /// Actual sample rate after negotiation
    pub sample_rate: u32,
    /// Actual number of channels
    pub channels: u32,
}

/// Open a PCM device for playback of interleaved S16LE samples.
pub fn open_playback(device: &str, sample_rate: u32, channels: u32) -> Result<(PCM, AlsaParams)> {
    let pcm = PCM::new(device, Direction::Playback, false)
        .with_context(|| format!("Failed to open PCM device '{}' for Playback", device))?;

    {
        let hwp = HwParams::any(&pcm).with_context(|| "Failed to initialize HwParams")?;
        hwp.set_access(Access::RWInterleaved)?;
        hwp.set_format(Format::S16LE)?;
        hwp.set_channels(channels)?;
        hwp.set_rate_near(sample_rate, ValueOr::Nearest)?;
        pcm.hw_params(&hwp)?;
    }

    // Read back actual negotiated parameters
    let params = {
        let hwp = pcm.hw_params_current()?;
        AlsaParams {
            sample_rate: hwp.get_rate()?,
            channels: hwp.get_channels()?,
        }
    };

    if params.sample_rate != sample_rate {
        log::warn!(
            "ALSA device {} runs at {}Hz, clip is {}Hz; pitch will be off",
            device,
            params.sample_rate,
            sample_rate,
        );
    }

    log::debug!(
        "ALSA Playback: device={}, rate={}, channels={}",
        device,
        params.sample_rate,
        params.channels,
    );

    Ok((pcm, params))
}
