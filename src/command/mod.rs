//! Command dispatcher — maps free text to a [`Command`].
//!
//! Voice and touch are two front-ends over one command set:
//!
//! ```text
//! transcript ──normalise──▶ fuzzy match ──▶ CommandTag ──(+ number)──▶ Command
//! ButtonId ─────────────────────────────────────────────from_button──▶ Command
//!                                                                        │
//!                                                     Kiosk::apply ◀─────┘
//! ```
//!
//! # Example
//!
//! ```
//! use photo_kiosk::command::{Command, CommandDispatcher};
//!
//! let dispatcher = CommandDispatcher::default();
//! assert_eq!(dispatcher.dispatch("  Bild Löschen "), Some(Command::DeleteCurrent));
//! assert_eq!(dispatcher.dispatch("gehe zu bild 2"), Some(Command::GoTo(2)));
//! assert_eq!(dispatcher.dispatch("xyzzy nonsense"), None);
//! ```

pub mod matcher;
pub mod vocabulary;

pub use vocabulary::{CommandTag, VOCABULARY};

use crate::overlay::ButtonId;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A fully resolved command, ready to be applied to the kiosk.
///
/// The first block mirrors [`CommandTag`]; the second holds the toggles only
/// reachable from the touch menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Faster,
    Slower,
    Next,
    Previous,
    SaveFavorite,
    PlayFavorites,
    PlayAll,
    DeleteCurrent,
    Restart,
    /// 1-based image number.
    GoTo(usize),
    Shutdown,

    /// Resume when paused, pause otherwise.
    TogglePlayback,
    /// Add the current image to favorites, or remove it when already there.
    ToggleFavorite,
    /// Switch between ALL and FAVORITES.
    ToggleMode,
    /// Show the info overlay.
    ShowInfo,
}

impl Command {
    /// The command bound to a menu button.
    pub fn from_button(button: ButtonId) -> Self {
        match button {
            ButtonId::Slower => Command::Slower,
            ButtonId::Previous => Command::Previous,
            ButtonId::PlayPause => Command::TogglePlayback,
            ButtonId::Next => Command::Next,
            ButtonId::Faster => Command::Faster,
            ButtonId::FavoriteToggle => Command::ToggleFavorite,
            ButtonId::ModeToggle => Command::ToggleMode,
            ButtonId::Info => Command::ShowInfo,
        }
    }

    /// Resolve a tag.  [`CommandTag::GoTo`] needs `number`; without it the
    /// command is unrecognised.
    pub fn from_tag(tag: CommandTag, number: Option<usize>) -> Option<Self> {
        let command = match tag {
            CommandTag::Pause => Command::Pause,
            CommandTag::Resume => Command::Resume,
            CommandTag::Faster => Command::Faster,
            CommandTag::Slower => Command::Slower,
            CommandTag::Next => Command::Next,
            CommandTag::Previous => Command::Previous,
            CommandTag::SaveFavorite => Command::SaveFavorite,
            CommandTag::PlayFavorites => Command::PlayFavorites,
            CommandTag::PlayAll => Command::PlayAll,
            CommandTag::DeleteCurrent => Command::DeleteCurrent,
            CommandTag::Restart => Command::Restart,
            CommandTag::GoTo => Command::GoTo(number?),
            CommandTag::Shutdown => Command::Shutdown,
        };
        Some(command)
    }
}

// ---------------------------------------------------------------------------
// CommandDispatcher
// ---------------------------------------------------------------------------

/// Fuzzy matcher over [`VOCABULARY`].
#[derive(Debug, Clone, Copy)]
pub struct CommandDispatcher {
    threshold: f64,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(70)
    }
}

impl CommandDispatcher {
    /// `threshold` is exclusive: a phrase must score strictly above it.
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: f64::from(threshold.min(100)),
        }
    }

    /// Best tag for `raw` and its score, if the score clears the threshold.
    pub fn match_tag(&self, raw: &str) -> Option<(CommandTag, f64)> {
        let normalised = raw.trim().to_lowercase();
        let (idx, score) =
            matcher::best_match(&normalised, VOCABULARY.iter().map(|(phrase, _)| *phrase))?;
        log::debug!(
            "dispatch: {normalised:?} best {:?} ({score:.1})",
            VOCABULARY[idx].0
        );
        (score > self.threshold).then(|| (VOCABULARY[idx].1, score))
    }

    /// Resolve a transcript into a command.
    ///
    /// For "gehe zu bild N" the first integer anywhere in `raw` is the image
    /// number; a phrase without one is unrecognised.
    pub fn dispatch(&self, raw: &str) -> Option<Command> {
        let (tag, _) = self.match_tag(raw)?;
        let number = match tag {
            CommandTag::GoTo => first_integer(raw),
            _ => None,
        };
        let command = Command::from_tag(tag, number);
        if command.is_none() {
            log::info!("dispatch: {raw:?} matched {tag:?} but carries no number");
        }
        command
    }
}

/// First run of ASCII digits in `text`, parsed as a number.
pub fn first_integer(text: &str) -> Option<usize> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_phrase_dispatches_to_its_own_tag() {
        let d = CommandDispatcher::default();
        for (phrase, tag) in VOCABULARY {
            let (matched, score) = d.match_tag(phrase).expect(phrase);
            assert_eq!(matched, *tag, "{phrase}");
            assert_eq!(score, 100.0);
        }
    }

    #[test]
    fn single_character_deletion_still_matches() {
        let d = CommandDispatcher::default();
        for (phrase, tag) in VOCABULARY {
            let mut edited: Vec<char> = phrase.chars().collect();
            edited.pop();
            let edited: String = edited.into_iter().collect();
            assert_eq!(d.match_tag(&edited).map(|(t, _)| t), Some(*tag), "{edited}");
        }
    }

    #[test]
    fn single_character_substitution_still_matches() {
        let d = CommandDispatcher::default();
        assert_eq!(d.match_tag("stipp").map(|(t, _)| t), Some(CommandTag::Pause));
        assert_eq!(d.match_tag("wetter").map(|(t, _)| t), Some(CommandTag::Resume));
        assert_eq!(
            d.match_tag("bild löscher").map(|(t, _)| t),
            Some(CommandTag::DeleteCurrent)
        );
    }

    #[test]
    fn edits_past_the_threshold_are_rejected() {
        let d = CommandDispatcher::default();
        // "stopp" vs "sto": 200·3/8 = 75 — still in.
        assert!(d.match_tag("sto").is_some());
        // "stopp" vs "st": 200·2/7 ≈ 57 — out.
        assert!(d.match_tag("st").is_none());
    }

    #[test]
    fn normalises_case_and_whitespace() {
        let d = CommandDispatcher::default();
        assert_eq!(d.dispatch("  SCHNELLER\n"), Some(Command::Faster));
        assert_eq!(d.dispatch("Von Vorne"), Some(Command::Restart));
    }

    #[test]
    fn nonsense_is_unrecognised() {
        let d = CommandDispatcher::default();
        assert_eq!(d.dispatch("xyzzy nonsense"), None);
        assert_eq!(d.dispatch(""), None);
    }

    #[test]
    fn go_to_extracts_number() {
        let d = CommandDispatcher::default();
        assert_eq!(d.dispatch("gehe zu bild 2"), Some(Command::GoTo(2)));
        assert_eq!(d.dispatch("Gehe zu Bild 12."), Some(Command::GoTo(12)));
    }

    #[test]
    fn go_to_without_number_is_unrecognised() {
        let d = CommandDispatcher::default();
        assert!(d.match_tag("gehe zu bild").is_some());
        assert_eq!(d.dispatch("gehe zu bild"), None);
    }

    #[test]
    fn number_is_ignored_for_other_commands() {
        let d = CommandDispatcher::default();
        assert_eq!(d.dispatch("weiter 3"), Some(Command::Resume));
    }

    #[test]
    fn stricter_threshold_rejects_fuzzy_phrases() {
        let strict = CommandDispatcher::new(95);
        assert!(strict.match_tag("stopp").is_some());
        assert!(strict.match_tag("stop").is_none());
    }

    #[test]
    fn first_integer_scans_digit_runs() {
        assert_eq!(first_integer("bild 7"), Some(7));
        assert_eq!(first_integer("3 und 4"), Some(3));
        assert_eq!(first_integer("nr42b"), Some(42));
        assert_eq!(first_integer("keine"), None);
    }

    #[test]
    fn buttons_map_to_commands() {
        assert_eq!(Command::from_button(ButtonId::PlayPause), Command::TogglePlayback);
        assert_eq!(Command::from_button(ButtonId::FavoriteToggle), Command::ToggleFavorite);
        assert_eq!(Command::from_button(ButtonId::ModeToggle), Command::ToggleMode);
        assert_eq!(Command::from_button(ButtonId::Info), Command::ShowInfo);
        assert_eq!(Command::from_button(ButtonId::Slower), Command::Slower);
    }

    #[test]
    fn tags_resolve_to_commands() {
        assert_eq!(Command::from_tag(CommandTag::GoTo, Some(1)), Some(Command::GoTo(1)));
        assert_eq!(Command::from_tag(CommandTag::GoTo, None), None);
        assert_eq!(Command::from_tag(CommandTag::Shutdown, None), Some(Command::Shutdown));
    }
}
