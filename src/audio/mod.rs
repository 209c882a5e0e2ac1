//! Microphone input for voice control.
//!
//! ```text
//! cpal callback ─▶ downmix ─▶ resample_to_16k ─▶ mpsc<Vec<f32>> ─▶ PhraseGate ─▶ phrase
//!  (audio thread)                                                  (listener thread)
//! ```

pub mod capture;
pub mod resample;
pub mod vad;

pub use capture::{CaptureError, MicStream, Microphone};
pub use resample::{downmix, resample_to_16k, TARGET_RATE};
pub use vad::{rms, GateEvent, PhraseGate, FRAME_SAMPLES};
