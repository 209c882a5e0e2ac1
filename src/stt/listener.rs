//! Blocking "listen for one phrase" front-end.
//!
//! ```text
//!  listen(timeout, phrase_limit)
//!     │
//!     ├─ Microphone::open/start ──▶ mpsc<Vec<f32>> (16 kHz mono)
//!     ├─ PhraseGate ──── Timeout ─────────────────────────▶ Err(Timeout)
//!     │       └───────── Phrase(samples)
//!     └─ Transcriber ─── ""  ─────────────────────────────▶ Err(Unintelligible)
//!                   └─── text ────────────────────────────▶ Ok(text)
//! ```
//!
//! Every call is bounded: the wait for onset by `timeout`, the phrase by
//! `phrase_limit`, and the whole call by their sum plus a small margin in
//! case the device stops delivering audio.

use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::audio::{CaptureError, GateEvent, Microphone, PhraseGate};
use crate::config::VoiceConfig;

use super::engine::{SttError, Transcriber};

// ---------------------------------------------------------------------------
// ListenError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenError {
    /// Nobody spoke before the timeout.
    #[error("no speech before timeout")]
    Timeout,

    /// Speech was captured but produced no text.
    #[error("speech could not be transcribed")]
    Unintelligible,

    /// The microphone or the recogniser failed.
    #[error("speech service error: {0}")]
    Service(String),
}

impl From<CaptureError> for ListenError {
    fn from(e: CaptureError) -> Self {
        ListenError::Service(e.to_string())
    }
}

impl From<SttError> for ListenError {
    fn from(e: SttError) -> Self {
        ListenError::Service(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// SpeechListener
// ---------------------------------------------------------------------------

/// One blocking listen call.  Shared across `spawn_blocking` calls, hence
/// `Send + Sync`.
pub trait SpeechListener: Send + Sync {
    fn listen(&self, timeout: Duration, phrase_limit: Duration) -> Result<String, ListenError>;
}

const DEVICE_MARGIN: Duration = Duration::from_secs(2);

/// Microphone → phrase gate → Whisper.
pub struct MicrophoneListener {
    transcriber: Arc<dyn Transcriber>,
    vad_threshold: f32,
}

impl MicrophoneListener {
    pub fn new(transcriber: Arc<dyn Transcriber>, cfg: &VoiceConfig) -> Self {
        Self {
            transcriber,
            vad_threshold: cfg.vad_threshold,
        }
    }

    /// Block until the gate yields a phrase or a timeout.
    fn capture(&self, timeout: Duration, phrase_limit: Duration) -> Result<Vec<f32>, ListenError> {
        // The device is opened per call: cpal streams are not Send on every
        // host, and an idle kiosk should not hold the microphone.
        let mic = Microphone::open()?;
        log::debug!("audio: capturing at {} Hz", mic.sample_rate());
        let (tx, rx) = mpsc::channel();
        let _stream = mic.start(tx)?;

        let mut gate = PhraseGate::new(self.vad_threshold, timeout, phrase_limit);
        let hard_deadline = Instant::now() + timeout + phrase_limit + DEVICE_MARGIN;

        let event = loop {
            let remaining = hard_deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break gate.finish();
            }
            match rx.recv_timeout(remaining) {
                Ok(buffer) => match gate.push(&buffer) {
                    GateEvent::Pending => {}
                    done => break done,
                },
                Err(mpsc::RecvTimeoutError::Timeout) => break gate.finish(),
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(ListenError::Service("audio stream closed".into()));
                }
            }
        };

        match event {
            GateEvent::Phrase(samples) => Ok(samples),
            GateEvent::Timeout | GateEvent::Pending => Err(ListenError::Timeout),
        }
    }
}

impl SpeechListener for MicrophoneListener {
    fn listen(&self, timeout: Duration, phrase_limit: Duration) -> Result<String, ListenError> {
        let samples = self.capture(timeout, phrase_limit)?;
        transcript_or_unintelligible(self.transcriber.transcribe(&samples)?)
    }
}

/// Whisper emits bracketed annotations such as `[Musik]` or `(Stille)` for
/// non-speech; those count as nothing heard.
fn transcript_or_unintelligible(text: String) -> Result<String, ListenError> {
    let cleaned: String = strip_annotations(&text);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ListenError::Unintelligible);
    }
    Ok(cleaned.to_string())
}

fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// ScriptedListener  (test-only)
// ---------------------------------------------------------------------------

/// Replays a fixed script of listen results.  When the script runs out it
/// requests shutdown (if given a signal) and reports timeouts.
#[cfg(test)]
pub struct ScriptedListener {
    script: std::sync::Mutex<std::collections::VecDeque<Result<String, ListenError>>>,
    on_exhausted: Option<crate::kiosk::ShutdownSignal>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedListener {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ListenError>>,
    {
        Self {
            script: std::sync::Mutex::new(script.into_iter().collect()),
            on_exhausted: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Shorthand for a script of successful transcripts.
    pub fn phrases(phrases: &[&str]) -> Self {
        Self::new(phrases.iter().map(|p| Ok(p.to_string())))
    }

    pub fn then_shutdown(mut self, signal: crate::kiosk::ShutdownSignal) -> Self {
        self.on_exhausted = Some(signal);
        self
    }
}

#[cfg(test)]
impl SpeechListener for ScriptedListener {
    fn listen(&self, _timeout: Duration, _phrase_limit: Duration) -> Result<String, ListenError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => {
                if let Some(signal) = &self.on_exhausted {
                    signal.request(crate::kiosk::ShutdownReason::Operator);
                }
                std::thread::sleep(Duration::from_millis(5));
                Err(ListenError::Timeout)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transcript_is_unintelligible() {
        assert_eq!(
            transcript_or_unintelligible("   ".into()),
            Err(ListenError::Unintelligible)
        );
    }

    #[test]
    fn annotation_only_transcript_is_unintelligible() {
        assert_eq!(
            transcript_or_unintelligible(" [Musik] (Stille) ".into()),
            Err(ListenError::Unintelligible)
        );
    }

    #[test]
    fn transcript_is_trimmed_and_annotations_removed() {
        assert_eq!(
            transcript_or_unintelligible(" [Musik] Nächstes Bild ".into()),
            Ok("Nächstes Bild".to_string())
        );
    }

    #[test]
    fn stt_errors_become_service_errors() {
        let e: ListenError = SttError::Transcription("boom".into()).into();
        assert!(matches!(e, ListenError::Service(msg) if msg.contains("boom")));
    }

    #[test]
    fn scripted_listener_replays_in_order() {
        let l = ScriptedListener::new([
            Ok("hey berry".to_string()),
            Err(ListenError::Unintelligible),
        ]);
        let d = Duration::from_secs(1);
        assert_eq!(l.listen(d, d), Ok("hey berry".to_string()));
        assert_eq!(l.listen(d, d), Err(ListenError::Unintelligible));
        assert_eq!(l.listen(d, d), Err(ListenError::Timeout));
        assert_eq!(l.calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[test]
    fn scripted_listener_requests_shutdown_when_exhausted() {
        let signal = crate::kiosk::ShutdownSignal::new();
        let l = ScriptedListener::phrases(&[]).then_shutdown(signal.clone());
        let d = Duration::from_secs(1);
        let _ = l.listen(d, d);
        assert!(signal.is_requested());
    }
}
