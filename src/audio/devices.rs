//! Contains the [`Output`] struct and the [`get_output`] function.
//! Used at startup to pick the output device and open a stream on it.

use anyhow::{bail, Context, Result};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, SampleFormat, Stream, SupportedStreamConfig,
};
use log::{error, info};

use super::player::Player;
use crate::misc::{SampleRate, Similarity};

/// The output device being used.
pub struct Output {
    /// cpal device for output
    pub device: Device,
    /// cpal stream config for output
    pub config: SupportedStreamConfig,
    /// Gain applied to every sample written to the device
    pub gain: f32,
}

impl Output {
    pub fn name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "unknown".to_owned())
    }

    pub fn sample_rate(&self) -> SampleRate {
        SampleRate(self.config.sample_rate().0)
    }
}

/// Picks the output device from its name.
/// `default` uses the host's default device, anything else picks the device whose
/// name has the highest string similarity (dice coefficient) to the given one.
pub fn get_output(wanted: &str, gain: f32) -> Result<Output> {
    let host = cpal::default_host();
    let wanted = wanted.to_lowercase();

    let comp_name = |dev: &Device| {
        dev.name()
            .map(|x| x.to_lowercase().similarity(&wanted))
            .unwrap_or(0.0)
    };

    let device = match wanted.as_str() {
        "default" => host
            .default_output_device()
            .context("No default output device")?,
        _ => {
            host.output_devices()
                .context("Could not list output devices")?
                .map(|x| (comp_name(&x), x))
                .reduce(|a, b| if a.0 > b.0 { a } else { b })
                .context("No output device found")?
                .1
        }
    };

    let config = device
        .default_output_config()
        .context("No default output config")?;

    Ok(Output {
        device,
        config,
        gain,
    })
}

/// An output stream that only starts making sound once it is activated.
/// It is activated on the first user command, so nothing plays before the user interacts.
pub struct OutputStream {
    stream: Stream,
    active: bool,
}

impl OutputStream {
    pub fn new(output: &Output, player: Player) -> Result<Self> {
        if output.config.sample_format() != SampleFormat::F32 {
            bail!(
                "Output device `{}` does not support f32 samples ({:?})",
                output.name(),
                output.config.sample_format()
            );
        }

        let channels = output.config.channels() as usize;
        let gain = output.gain;
        let stream = output
            .device
            .build_output_stream(
                &output.config.clone().into(),
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    player.output(data, channels, gain);
                },
                move |err| error!("Output stream error: {err}"),
                None,
            )
            .context("Could not build output stream")?;

        Ok(Self {
            stream,
            active: false,
        })
    }

    pub fn activate(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }

        self.stream.play().context("Could not start output stream")?;
        self.active = true;
        info!("Audio output activated");
        Ok(())
    }
}
