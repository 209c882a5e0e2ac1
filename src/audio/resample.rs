//! Conversion of device audio to the 16 kHz mono stream Whisper expects.
//!
//! Each cpal callback buffer passes through [`downmix`] and then
//! [`resample_to_16k`] before it leaves the audio thread.  Resampling is
//! linear interpolation per buffer, which is plenty for command words.

/// Sample rate of everything downstream of the capture callback.
pub const TARGET_RATE: u32 = 16_000;

/// Average interleaved frames of `channels` samples into one mono sample.
///
/// A trailing partial frame is dropped.  `channels == 0` yields nothing.
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    let n = usize::from(channels);
    match n {
        0 => Vec::new(),
        1 => samples.to_vec(),
        _ => samples
            .chunks_exact(n)
            .map(|frame| frame.iter().sum::<f32>() / n as f32)
            .collect(),
    }
}

/// Linearly resample mono `samples` from `source_rate` to [`TARGET_RATE`].
///
/// The output holds `ceil(len · 16000 / source_rate)` samples.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_RATE || source_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let step = f64::from(source_rate) / f64::from(TARGET_RATE);
    let out_len = (samples.len() as f64 / step).ceil() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let lo = (pos as usize).min(last);
            let hi = (lo + 1).min(last);
            let t = (pos - lo as f64) as f32;
            samples[lo] + (samples[hi] - samples[lo]) * t
        })
        .collect()
}
