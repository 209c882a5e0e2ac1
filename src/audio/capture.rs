//! Microphone capture via `cpal`.
//!
//! [`Microphone::start`] delivers 16 kHz mono buffers over an mpsc channel.
//! Conversion happens on the audio thread so the listener only ever sees
//! Whisper-ready samples.  The returned [`MicStream`] is a RAII guard:
//! dropping it stops the hardware stream.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::resample::{downmix, resample_to_16k};

/// Errors while opening or running the input stream.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Keeps the cpal stream alive.
pub struct MicStream {
    _stream: cpal::Stream,
}

/// The default input device with its preferred configuration.
pub struct Microphone {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl Microphone {
    /// Open the system default input device.
    pub fn open() -> Result<Self, CaptureError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;
        let supported = device.default_input_config()?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        log::debug!("audio: input at {sample_rate} Hz, {channels} channel(s)");

        Ok(Self {
            device,
            config: supported.into(),
            sample_rate,
            channels,
        })
    }

    /// Start streaming 16 kHz mono buffers into `tx`.
    ///
    /// Sends after the receiver is gone are dropped silently.
    pub fn start(&self, tx: mpsc::Sender<Vec<f32>>) -> Result<MicStream, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mono = downmix(data, channels);
                let _ = tx.send(resample_to_16k(&mono, sample_rate));
            },
            |err: cpal::StreamError| {
                log::error!("audio: stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        Ok(MicStream { _stream: stream })
    }

    /// Native device rate in Hz, before conversion.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
