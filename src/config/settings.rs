//! Kiosk settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]` so a hand-edited `settings.toml` only
//! needs to list the values it overrides.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SlideshowConfig
// ---------------------------------------------------------------------------

/// Image pool and playback pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideshowConfig {
    /// Folder scanned for images on start-up and whenever the ALL playlist is
    /// rebuilt.
    pub image_folder: PathBuf,
    /// Accepted file extensions, compared case-insensitively and without the
    /// leading dot.
    pub extensions: Vec<String>,
    /// Seconds each image stays on screen.  Values below 1 are clamped to 1.
    pub interval_secs: u64,
    /// JSON file holding the favorites list.  `None` means the default
    /// location under the config directory.
    pub favorites_file: Option<PathBuf>,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            image_folder: PathBuf::from("images"),
            extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            interval_secs: 10,
            favorites_file: None,
        }
    }
}

impl SlideshowConfig {
    /// The favorites file actually used: the configured one, or the default
    /// under [`AppPaths`].
    pub fn favorites_path(&self) -> PathBuf {
        self.favorites_file
            .clone()
            .unwrap_or_else(|| AppPaths::new().favorites_file)
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

/// Canvas geometry and render-loop pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Open the window fullscreen and undecorated.
    pub fullscreen: bool,
    /// Render tick period in milliseconds.
    pub tick_ms: u64,
    /// Rotate raw touch coordinates by 180° before hit-testing (panels
    /// mounted upside down).
    pub flip_touch: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            fullscreen: true,
            tick_ms: 100,
            flip_touch: false,
        }
    }
}

// ---------------------------------------------------------------------------
// OverlayConfig
// ---------------------------------------------------------------------------

/// Durations of the time-based overlay transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Menu hides after this many seconds without a touch.
    pub menu_idle_secs: u64,
    /// Menu hides this many seconds after a button press.
    pub highlight_secs: u64,
    /// Info overlay lifetime in seconds.
    pub info_secs: u64,
    /// Lifetime of each feedback border in milliseconds.
    pub feedback_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            menu_idle_secs: 5,
            highlight_secs: 3,
            info_secs: 10,
            feedback_ms: 1_000,
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// Voice control: wake phrase, command window and the Whisper backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Disable to run the kiosk touch-only.
    pub enabled: bool,
    /// GGML model file stem looked up in the models directory.
    pub model: String,
    /// ISO-639-1 language code passed to Whisper.
    pub language: String,
    /// Any of these substrings in a transcript counts as the wake phrase.
    pub wake_words: Vec<String>,
    /// Seconds to wait for speech to start while listening for the wake phrase.
    pub wake_timeout_secs: u64,
    /// Seconds to wait for speech to start while listening for a command.
    pub command_timeout_secs: u64,
    /// Maximum length of a single phrase in seconds.
    pub phrase_limit_secs: u64,
    /// Minimum fuzzy score (exclusive, 0–100) for a phrase to match a command.
    pub match_threshold: u8,
    /// RMS level above which a 30 ms audio frame counts as speech.
    pub vad_threshold: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "ggml-base".into(),
            language: "de".into(),
            wake_words: vec![
                "hey berry".into(),
                "hey baby".into(),
                "hey barry".into(),
                "hey bery".into(),
                "hibery".into(),
            ],
            wake_timeout_secs: 10,
            command_timeout_secs: 10,
            phrase_limit_secs: 5,
            match_threshold: 70,
            vad_threshold: 0.01,
        }
    }
}

// ---------------------------------------------------------------------------
// SystemConfig
// ---------------------------------------------------------------------------

/// Process-level behaviour on shutdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Program and arguments run (fire-and-forget) after the voice
    /// `ausschalten` command, e.g. `["sudo", "shutdown", "now"]`.  Empty means
    /// the kiosk only exits.
    pub shutdown_command: Vec<String>,
    /// Rewrite the favorites file once more on exit.
    pub flush_favorites_on_exit: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            shutdown_command: Vec::new(),
            flush_favorites_on_exit: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level kiosk configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use photo_kiosk::config::AppConfig;
///
/// // Returns Default when the file is missing
/// let config = AppConfig::load().unwrap();
/// assert!(config.slideshow.interval_secs >= 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub slideshow: SlideshowConfig,
    pub display: DisplayConfig,
    pub overlay: OverlayConfig,
    pub voice: VoiceConfig,
    pub system: SystemConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");

        assert_eq!(config.slideshow.interval_secs, 10);
        assert_eq!(config.voice.language, "de");
        assert_eq!(config.display.width, 800);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.slideshow.extensions, vec!["png", "jpg", "jpeg"]);
        assert_eq!(cfg.display.height, 480);
        assert_eq!(cfg.display.tick_ms, 100);
        assert!(!cfg.display.flip_touch);
        assert_eq!(cfg.overlay.menu_idle_secs, 5);
        assert_eq!(cfg.overlay.highlight_secs, 3);
        assert_eq!(cfg.overlay.info_secs, 10);
        assert_eq!(cfg.overlay.feedback_ms, 1_000);
        assert_eq!(cfg.voice.match_threshold, 70);
        assert_eq!(cfg.voice.phrase_limit_secs, 5);
        assert!(cfg.voice.wake_words.iter().any(|w| w == "hey berry"));
        assert!(cfg.system.shutdown_command.is_empty());
        assert!(cfg.system.flush_favorites_on_exit);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.slideshow.image_folder = PathBuf::from("/srv/kiosk/images");
        cfg.slideshow.interval_secs = 4;
        cfg.display.flip_touch = true;
        cfg.voice.model = "ggml-small".into();
        cfg.system.shutdown_command = vec!["sudo".into(), "shutdown".into(), "now".into()];

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.slideshow.image_folder, PathBuf::from("/srv/kiosk/images"));
        assert_eq!(loaded.slideshow.interval_secs, 4);
        assert!(loaded.display.flip_touch);
        assert_eq!(loaded.voice.model, "ggml-small");
        assert_eq!(loaded.system.shutdown_command.len(), 3);
    }

    /// A partial file only overrides what it lists.
    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[slideshow]\ninterval_secs = 3\n").expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.slideshow.interval_secs, 3);
        assert_eq!(loaded.slideshow.extensions.len(), 3);
        assert_eq!(loaded.voice.language, "de");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[slideshow\ninterval_secs = ").expect("write");

        assert!(AppConfig::load_from(&path).is_err());
    }
}
