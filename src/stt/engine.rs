//! Speech-to-text backend.
//!
//! [`Transcriber`] is the seam the microphone listener calls into.  It is
//! object-safe and `Send + Sync` so one loaded model can be shared behind an
//! `Arc<dyn Transcriber>` by every blocking listen call.
//!
//! [`WhisperTranscriber`] wraps a `whisper_rs::WhisperContext`; a fresh
//! `WhisperState` is created per call so no locking is needed.

use std::path::Path;

use thiserror::Error;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::TARGET_RATE;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum SttError {
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("whisper context initialisation failed: {0}")]
    ContextInit(String),

    #[error("transcription error: {0}")]
    Transcription(String),

    #[error("audio too long: {0} samples (max {})", MAX_SAMPLES)]
    AudioTooLong(usize),
}

// ---------------------------------------------------------------------------
// Transcriber
// ---------------------------------------------------------------------------

/// 16 kHz mono `f32` audio in, trimmed text out.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError>;
}

/// whisper.cpp refuses input under one second; shorter phrases are padded
/// with silence up to this length.
const MIN_SAMPLES: usize = TARGET_RATE as usize * 11 / 10;
/// 30 s, one Whisper window.
const MAX_SAMPLES: usize = TARGET_RATE as usize * 30;

/// Zero-pad `audio` to the minimum Whisper accepts.
pub fn pad_to_minimum(audio: &[f32]) -> std::borrow::Cow<'_, [f32]> {
    if audio.len() >= MIN_SAMPLES {
        return std::borrow::Cow::Borrowed(audio);
    }
    let mut padded = audio.to_vec();
    padded.resize(MIN_SAMPLES, 0.0);
    std::borrow::Cow::Owned(padded)
}

// ---------------------------------------------------------------------------
// WhisperTranscriber
// ---------------------------------------------------------------------------

pub struct WhisperTranscriber {
    ctx: WhisperContext,
    language: String,
    n_threads: i32,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("language", &self.language)
            .field("n_threads", &self.n_threads)
            .finish_non_exhaustive()
    }
}

// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs; the model
// weights are read-only after loading.
unsafe impl Send for WhisperTranscriber {}
unsafe impl Sync for WhisperTranscriber {}

impl WhisperTranscriber {
    /// Load a GGML model.  `language` is an ISO-639-1 code or `"auto"`.
    pub fn load(model_path: impl AsRef<Path>, language: &str) -> Result<Self, SttError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }
        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!("non-UTF-8 model path: {}", path.display()))
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        log::info!("stt: loaded {} (language {language})", path.display());
        Ok(Self {
            ctx,
            language: language.to_string(),
            n_threads: inference_threads(),
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        if audio.len() > MAX_SAMPLES {
            return Err(SttError::AudioTooLong(audio.len()));
        }
        let audio = pad_to_minimum(audio);

        let mut fp = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        let lang = (self.language != "auto").then_some(self.language.as_str());
        fp.set_language(lang);
        fp.set_n_threads(self.n_threads);
        fp.set_print_progress(false);
        fp.set_print_realtime(false);
        fp.set_single_segment(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        let started = std::time::Instant::now();
        state
            .full(fp, &audio)
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::Transcription(format!("segment {i}: {e}")))?;
            text.push_str(&segment);
        }

        let text = text.trim().to_string();
        log::debug!("stt: {text:?} in {} ms", started.elapsed().as_millis());
        Ok(text)
    }
}

/// Available parallelism capped at 4; the kiosk shares the CPU with rendering.
fn inference_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(4) as i32)
        .unwrap_or(2)
}

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// Returns a fixed response without loading a model.
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<String, SttError>,
}

#[cfg(test)]
impl MockTranscriber {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
        }
    }

    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
impl Transcriber for MockTranscriber {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        if audio.len() > MAX_SAMPLES {
            return Err(SttError::AudioTooLong(audio.len()));
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
