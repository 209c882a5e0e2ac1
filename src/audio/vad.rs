//! Energy-based phrase gate.
//!
//! [`PhraseGate`] turns a continuous 16 kHz mono stream into at most one
//! spoken phrase.  Audio is judged in 30 ms frames: a frame is *voice* when
//! its RMS exceeds the threshold.
//!
//! ```text
//!              voice frame                 trailing silence ≥ hangover
//!   Waiting ───────────────▶ InPhrase ──────────────────────────────▶ Phrase(samples)
//!      │                        │
//!      │ no voice for timeout   │ phrase limit reached
//!      ▼                        ▼
//!   Timeout                  Phrase(samples)
//! ```
//!
//! A short pre-roll of the frames seen just before onset is kept so the
//! first consonant is not clipped.

use std::collections::VecDeque;
use std::time::Duration;

use super::resample::TARGET_RATE;

/// 30 ms at 16 kHz.
pub const FRAME_SAMPLES: usize = 480;

/// Silence that ends a phrase.
const HANGOVER: Duration = Duration::from_millis(800);
/// Audio kept from before the onset frame.
const PRE_ROLL: Duration = Duration::from_millis(300);

/// Root-mean-square level of `frame`.  Zero for an empty slice.
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}

fn frames_in(d: Duration) -> usize {
    let samples = d.as_millis() as usize * TARGET_RATE as usize / 1_000;
    samples.div_ceil(FRAME_SAMPLES).max(1)
}

/// Result of feeding audio to the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateEvent {
    /// Keep feeding.
    Pending,
    /// A complete phrase, pre-roll included.
    Phrase(Vec<f32>),
    /// No speech started before the timeout.
    Timeout,
}

#[derive(Debug)]
enum Phase {
    Waiting { idle_frames: usize },
    InPhrase { silent_run: usize },
    Done,
}

#[derive(Debug)]
pub struct PhraseGate {
    threshold: f32,
    timeout_frames: usize,
    limit_frames: usize,
    hangover_frames: usize,
    pre_roll: VecDeque<Vec<f32>>,
    pre_roll_frames: usize,
    partial: Vec<f32>,
    phrase: Vec<f32>,
    phrase_frames: usize,
    phase: Phase,
}

impl PhraseGate {
    /// `timeout` bounds the wait for speech to start; `phrase_limit` bounds
    /// the phrase itself.
    pub fn new(threshold: f32, timeout: Duration, phrase_limit: Duration) -> Self {
        let pre_roll_frames = frames_in(PRE_ROLL);
        Self {
            threshold,
            timeout_frames: frames_in(timeout),
            limit_frames: frames_in(phrase_limit),
            hangover_frames: frames_in(HANGOVER),
            pre_roll: VecDeque::with_capacity(pre_roll_frames),
            pre_roll_frames,
            partial: Vec::with_capacity(FRAME_SAMPLES),
            phrase: Vec::new(),
            phrase_frames: 0,
            phase: Phase::Waiting { idle_frames: 0 },
        }
    }

    /// Feed samples of any length.  Once a terminal event has been returned
    /// further input is ignored and `Pending` is returned.
    pub fn push(&mut self, samples: &[f32]) -> GateEvent {
        for &s in samples {
            self.partial.push(s);
            if self.partial.len() < FRAME_SAMPLES {
                continue;
            }
            let frame = std::mem::replace(&mut self.partial, Vec::with_capacity(FRAME_SAMPLES));
            match self.frame(frame) {
                GateEvent::Pending => {}
                done => return done,
            }
        }
        GateEvent::Pending
    }

    /// The stream ended: whatever was collected so far.
    pub fn finish(&mut self) -> GateEvent {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::InPhrase { .. } => {
                self.phrase.append(&mut self.partial);
                GateEvent::Phrase(std::mem::take(&mut self.phrase))
            }
            Phase::Waiting { .. } => GateEvent::Timeout,
            Phase::Done => GateEvent::Pending,
        }
    }

    fn frame(&mut self, frame: Vec<f32>) -> GateEvent {
        let voice = rms(&frame) > self.threshold;
        match &mut self.phase {
            Phase::Done => GateEvent::Pending,
            Phase::Waiting { idle_frames } => {
                if voice {
                    for earlier in self.pre_roll.drain(..) {
                        self.phrase.extend_from_slice(&earlier);
                    }
                    self.phrase.extend_from_slice(&frame);
                    self.phrase_frames = 1;
                    self.phase = Phase::InPhrase { silent_run: 0 };
                    return self.check_limit();
                }
                *idle_frames += 1;
                if *idle_frames >= self.timeout_frames {
                    self.phase = Phase::Done;
                    return GateEvent::Timeout;
                }
                if self.pre_roll.len() == self.pre_roll_frames {
                    self.pre_roll.pop_front();
                }
                self.pre_roll.push_back(frame);
                GateEvent::Pending
            }
            Phase::InPhrase { silent_run } => {
                *silent_run = if voice { 0 } else { *silent_run + 1 };
                let ended = *silent_run >= self.hangover_frames;
                self.phrase.extend_from_slice(&frame);
                self.phrase_frames += 1;
                if ended {
                    self.phase = Phase::Done;
                    return GateEvent::Phrase(std::mem::take(&mut self.phrase));
                }
                self.check_limit()
            }
        }
    }

    fn check_limit(&mut self) -> GateEvent {
        if self.phrase_frames >= self.limit_frames {
            self.phase = Phase::Done;
            return GateEvent::Phrase(std::mem::take(&mut self.phrase));
        }
        GateEvent::Pending
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LOUD: f32 = 0.5;

    fn frames(n: usize, level: f32) -> Vec<f32> {
        vec![level; n * FRAME_SAMPLES]
    }

    fn gate() -> PhraseGate {
        PhraseGate::new(0.01, Duration::from_secs(1), Duration::from_secs(5))
    }

    #[test]
    fn rms_of_constant_signal() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn silence_times_out() {
        let mut g = gate();
        // 1 s = 16 000 samples = 34 frames (rounded up).
        assert_eq!(g.push(&frames(33, 0.0)), GateEvent::Pending);
        assert_eq!(g.push(&frames(1, 0.0)), GateEvent::Timeout);
    }

    #[test]
    fn phrase_ends_after_hangover() {
        let mut g = gate();
        g.push(&frames(2, 0.0));
        assert_eq!(g.push(&frames(10, LOUD)), GateEvent::Pending);

        // 800 ms hangover = 27 frames.
        let event = g.push(&frames(27, 0.0));
        let GateEvent::Phrase(samples) = event else {
            panic!("expected phrase, got {event:?}");
        };
        // 2 pre-roll + 10 voice + 27 trailing.
        assert_eq!(samples.len(), 39 * FRAME_SAMPLES);
    }

    #[test]
    fn pre_roll_is_bounded() {
        let mut g = gate();
        g.push(&frames(20, 0.0));
        g.push(&frames(1, LOUD));
        let GateEvent::Phrase(samples) = g.finish() else {
            panic!("expected phrase");
        };
        // 300 ms pre-roll = 10 frames.
        assert_eq!(samples.len(), 11 * FRAME_SAMPLES);
    }

    #[test]
    fn phrase_limit_cuts_continuous_speech() {
        let mut g = PhraseGate::new(0.01, Duration::from_secs(1), Duration::from_millis(300));
        let event = g.push(&frames(50, LOUD));
        let GateEvent::Phrase(samples) = event else {
            panic!("expected phrase, got {event:?}");
        };
        assert_eq!(samples.len(), 10 * FRAME_SAMPLES);
    }

    #[test]
    fn brief_pause_does_not_end_phrase() {
        let mut g = gate();
        g.push(&frames(5, LOUD));
        g.push(&frames(20, 0.0));
        assert_eq!(g.push(&frames(5, LOUD)), GateEvent::Pending);
    }

    #[test]
    fn frames_may_span_pushes() {
        let mut g = gate();
        let loud = frames(1, LOUD);
        assert_eq!(g.push(&loud[..100]), GateEvent::Pending);
        assert_eq!(g.push(&loud[100..]), GateEvent::Pending);
        assert!(matches!(g.finish(), GateEvent::Phrase(s) if s.len() == FRAME_SAMPLES));
    }

    #[test]
    fn finish_without_speech_is_timeout() {
        let mut g = gate();
        g.push(&frames(3, 0.0));
        assert_eq!(g.finish(), GateEvent::Timeout);
    }

    #[test]
    fn input_after_terminal_event_is_ignored() {
        let mut g = gate();
        g.push(&frames(34, 0.0));
        assert_eq!(g.push(&frames(5, LOUD)), GateEvent::Pending);
        assert_eq!(g.finish(), GateEvent::Pending);
    }
}
