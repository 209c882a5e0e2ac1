//! Application entry point — voice-controlled photo kiosk.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the image library and favorites store, then the shared kiosk.
//! 5. Load the Whisper model and spawn the voice loop (skipped when voice is
//!    disabled or the model is missing).
//! 6. Spawn the Ctrl-C watcher.
//! 7. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.
//! 8. Flush favorites and, after a spoken shutdown, run the configured
//!    system command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context as _, Result};
use eframe::egui;

use photo_kiosk::{
    app::KioskApp,
    config::{AppConfig, AppPaths, SystemConfig},
    kiosk::{
        lock_kiosk, touch_channel, Kiosk, RenderLoop, SharedKiosk, ShutdownReason, ShutdownSignal,
        VoiceLoop,
    },
    library::{FolderLibrary, JsonFavorites},
    stt::{MicrophoneListener, SpeechListener, Transcriber, WhisperTranscriber},
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let display = &config.display;
    let vp = egui::ViewportBuilder::default()
        .with_title("Photo Kiosk")
        .with_inner_size([display.width as f32, display.height as f32])
        .with_decorations(!display.fullscreen)
        .with_fullscreen(display.fullscreen);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// Spawn the voice loop, or log why the kiosk stays touch-only.
fn start_voice(
    rt: &tokio::runtime::Runtime,
    config: &AppConfig,
    kiosk: &SharedKiosk,
    shutdown: &ShutdownSignal,
) {
    if !config.voice.enabled {
        log::info!("voice: disabled in settings");
        return;
    }

    let model_path = AppPaths::new().model_file(&config.voice.model);
    let transcriber: Arc<dyn Transcriber> =
        match WhisperTranscriber::load(&model_path, &config.voice.language) {
            Ok(engine) => {
                log::info!("stt: model loaded from {}", model_path.display());
                Arc::new(engine)
            }
            Err(e) => {
                log::warn!("stt: {e}; running touch-only");
                return;
            }
        };

    let listener: Arc<dyn SpeechListener> =
        Arc::new(MicrophoneListener::new(transcriber, &config.voice));
    let voice = VoiceLoop::new(Arc::clone(kiosk), listener, &config.voice, shutdown.clone());
    rt.spawn(voice.run());
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

/// Start the configured system command without waiting for it.
fn run_shutdown_command(system: &SystemConfig) {
    let Some((program, args)) = system.shutdown_command.split_first() else {
        log::info!("kiosk: no shutdown command configured");
        return;
    };
    match std::process::Command::new(program).args(args).spawn() {
        Ok(child) => log::info!("kiosk: started {program:?} (pid {})", child.id()),
        Err(e) => log::error!("kiosk: cannot run {program:?}: {e}"),
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Photo kiosk starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads — voice loop + signal watcher)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Library, favorites, shared kiosk
    let library = FolderLibrary::from_config(&config.slideshow);
    let favorites = JsonFavorites::new(config.slideshow.favorites_path());
    log::info!(
        "library: {} (favorites in {})",
        library.folder().display(),
        favorites.path().display()
    );
    let kiosk = Kiosk::new(
        Box::new(library),
        Box::new(favorites),
        &config,
        std::time::Instant::now(),
    )
    .into_shared();
    let shutdown = ShutdownSignal::new();

    // 5. Voice loop
    start_voice(&rt, &config, &kiosk, &shutdown);

    // 6. Ctrl-C
    {
        let shutdown = shutdown.clone();
        rt.spawn(async move {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        log::warn!("kiosk: cannot listen for Ctrl-C: {e}");
                        return;
                    }
                    log::info!("kiosk: interrupted");
                    shutdown.request(ShutdownReason::Signal);
                }
                _ = shutdown.requested() => {}
            }
        });
    }

    // 7. Window (blocks until closed)
    let (touch_tx, touch_queue) = touch_channel();
    let render = RenderLoop::new(Arc::clone(&kiosk), touch_queue, shutdown.clone());
    let app = KioskApp::new(render, touch_tx, &config.display);

    let ui_result = eframe::run_native(
        "Photo Kiosk",
        native_options(&config),
        Box::new(move |_cc| Ok(Box::new(app))),
    );

    // 8. Teardown
    shutdown.request(ShutdownReason::Operator);
    rt.shutdown_timeout(Duration::from_secs(2));

    if config.system.flush_favorites_on_exit {
        if let Err(e) = lock_kiosk(&kiosk).flush_favorites() {
            log::error!("favorites: final save failed: {e}");
        }
    }

    let reason = shutdown.reason();
    log::info!("Photo kiosk stopped ({reason:?})");
    if reason == Some(ShutdownReason::VoiceCommand) {
        run_shutdown_command(&config.system);
    }

    ui_result.map_err(|e| anyhow!("window error: {e}"))
}
