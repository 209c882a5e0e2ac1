//! Cross-platform kiosk paths using the `dirs` crate.
//!
//! Config dir (settings + favorites):
//!   Linux:   ~/.config/photo-kiosk/
//!   macOS:   ~/Library/Application Support/photo-kiosk/
//!   Windows: %APPDATA%\photo-kiosk\
//!
//! Data dir (Whisper models):
//!   Linux:   ~/.local/share/photo-kiosk/models/
//!   macOS:   ~/Library/Application Support/photo-kiosk/models/
//!   Windows: %LOCALAPPDATA%\photo-kiosk\models\

use std::path::PathBuf;

/// Holds all resolved kiosk directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `favorites.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default location of the favorites list.
    pub favorites_file: PathBuf,
    /// Directory searched for GGML model files.
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "photo-kiosk";

    /// Resolves all paths, falling back to the current directory when the
    /// platform has no standard location.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            favorites_file: config_dir.join("favorites.json"),
            models_dir: data_dir.join("models"),
            config_dir,
        }
    }

    /// Path of the GGML model file for `model` (a file stem such as
    /// `"ggml-base"`).
    pub fn model_file(&self, model: &str) -> PathBuf {
        self.models_dir.join(format!("{model}.bin"))
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
