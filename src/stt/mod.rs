//! Speech-to-text for voice control.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │              SpeechListener (trait)                    │
//! │                                                       │
//! │   MicrophoneListener                                  │
//! │     Microphone ─▶ PhraseGate ─▶ Transcriber (trait)   │
//! │                                   └ WhisperTranscriber│
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! The voice loop only sees [`SpeechListener::listen`], a blocking call with
//! bounded timeouts that yields text or a [`ListenError`].

pub mod engine;
pub mod listener;

pub use engine::{SttError, Transcriber, WhisperTranscriber};
pub use listener::{ListenError, MicrophoneListener, SpeechListener};

#[cfg(test)]
pub use engine::MockTranscriber;
#[cfg(test)]
pub use listener::ScriptedListener;
