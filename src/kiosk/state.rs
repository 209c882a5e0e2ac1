//! The kiosk aggregate: playback model, overlay state and their stores.
//!
//! [`Kiosk`] is the single source of truth shared by the render loop and the
//! voice loop through [`SharedKiosk`] (`Arc<Mutex<Kiosk>>`).  Every public
//! method is one complete critical section: callers lock, call one method,
//! and unlock, so neither loop ever observes a half-applied command.
//!
//! ```text
//!  voice loop ──dispatch──▶ Command ─┐
//!                                    ├─▶ Kiosk::apply ─▶ PlaybackState / OverlayState
//!  render loop ─touch─▶ ButtonId ────┘                    │
//!                                                         ├─▶ FavoritesStore::save
//!                                                         └─▶ ImageLibrary::remove
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::command::Command;
use crate::config::AppConfig;
use crate::library::{FavoritesStore, ImageLibrary, LibraryError};
use crate::overlay::{
    BorderKind, ButtonId, ButtonLayout, OverlayState, OverlayTimings, TouchOutcome, TouchPoint,
};
use crate::playback::{ItemId, PlaybackState, PlaylistMode};

/// Shared handle to the kiosk.  Cheap to clone.
pub type SharedKiosk = Arc<Mutex<Kiosk>>;

/// Lock the kiosk, recovering from a poisoned mutex.
///
/// Every mutation is a single method call that leaves the model consistent,
/// so the state behind a poisoned lock is still valid.
pub fn lock_kiosk(kiosk: &SharedKiosk) -> MutexGuard<'_, Kiosk> {
    kiosk.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// CommandOutcome
// ---------------------------------------------------------------------------

/// Result of [`Kiosk::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command took effect.
    Applied,
    /// The command was understood but had nothing to act on.
    Rejected(&'static str),
    /// The shutdown command.  The caller raises the shutdown signal.
    Shutdown,
}

// ---------------------------------------------------------------------------
// FrameSnapshot
// ---------------------------------------------------------------------------

/// Everything the painter needs for one frame, copied out under the lock.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub image: Option<ItemId>,
    pub border: Option<BorderKind>,
    pub menu: Option<MenuSnapshot>,
    pub info: Option<InfoSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuSnapshot {
    pub highlighted: Option<ButtonId>,
    pub paused: bool,
    pub favorite: bool,
    pub mode: PlaylistMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoSnapshot {
    pub file_name: String,
    /// 1-based position in the active playlist; 0 when it is empty.
    pub position: usize,
    pub total: usize,
    pub mode: PlaylistMode,
    pub paused: bool,
    pub interval_secs: u64,
}

impl InfoSnapshot {
    /// Text lines for the info panel.
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.file_name.clone(),
            format!("Bild {} / {}", self.position, self.total),
            format!("Modus: {}", self.mode.label()),
            if self.paused {
                "Pausiert".to_string()
            } else {
                "Läuft".to_string()
            },
            format!("Intervall: {} s", self.interval_secs),
        ]
    }
}

// ---------------------------------------------------------------------------
// Kiosk
// ---------------------------------------------------------------------------

pub struct Kiosk {
    playback: PlaybackState,
    overlay: OverlayState,
    layout: ButtonLayout,
    flip_touch: bool,
    library: Box<dyn ImageLibrary>,
    favorites: Box<dyn FavoritesStore>,
}

impl Kiosk {
    /// Build the kiosk from the image pool and the persisted favorites.
    ///
    /// An unreadable pool starts the kiosk empty; it is listed again whenever
    /// the ALL playlist is selected.
    pub fn new(
        library: Box<dyn ImageLibrary>,
        favorites: Box<dyn FavoritesStore>,
        cfg: &AppConfig,
        now: Instant,
    ) -> Self {
        let all = library.list().unwrap_or_else(|e| {
            log::warn!("kiosk: cannot list images: {e}");
            Vec::new()
        });
        let favs = favorites.load();
        log::info!("kiosk: {} images, {} favorites", all.len(), favs.len());

        Self {
            playback: PlaybackState::new(all, favs, cfg.slideshow.interval_secs, now),
            overlay: OverlayState::new(OverlayTimings::from(&cfg.overlay), now),
            layout: ButtonLayout::for_canvas(cfg.display.width, cfg.display.height),
            flip_touch: cfg.display.flip_touch,
            library,
            favorites,
        }
    }

    pub fn into_shared(self) -> SharedKiosk {
        Arc::new(Mutex::new(self))
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn layout(&self) -> &ButtonLayout {
        &self.layout
    }

    // -----------------------------------------------------------------------
    // Per-tick work
    // -----------------------------------------------------------------------

    /// Expire overlay timers and advance the slideshow if it is due.
    /// Returns `true` when a new image became current.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.overlay.expire(now);
        let advanced = self.playback.tick(now);
        if advanced {
            log::debug!("render: advanced to {:?}", self.playback.current());
        }
        advanced
    }

    /// Feed one raw touch.  Returns the outcome of the pressed button's
    /// command, or `None` when the touch only changed the overlay.
    pub fn handle_touch(&mut self, point: TouchPoint, now: Instant) -> Option<CommandOutcome> {
        let point = if self.flip_touch {
            let (w, h) = self.layout.canvas();
            point.flipped(w, h)
        } else {
            point
        };
        let hit = self.layout.hit_test(point);

        match self.overlay.on_touch(hit, now) {
            TouchOutcome::Pressed(button) => {
                let outcome = self.apply(Command::from_button(button), now);
                log::debug!("render: {button:?} → {outcome:?}");
                Some(outcome)
            }
            other => {
                log::debug!("render: touch at ({:.0}, {:.0}) → {other:?}", point.x, point.y);
                None
            }
        }
    }

    /// Arm a feedback border.
    pub fn flash(&mut self, kind: BorderKind, now: Instant) {
        self.overlay.flash(kind, now);
    }

    /// Copy out what the next frame shows.
    pub fn snapshot(&self, now: Instant) -> FrameSnapshot {
        let pb = &self.playback;
        let current = pb.current();

        let menu = self.overlay.is_menu_visible().then(|| MenuSnapshot {
            highlighted: self.overlay.highlighted(),
            paused: pb.is_paused(),
            favorite: current.is_some_and(|c| pb.is_favorite(c)),
            mode: pb.mode(),
        });

        let info = self.overlay.is_info_visible().then(|| {
            let total = pb.active().len();
            InfoSnapshot {
                file_name: current
                    .map(|c| display_name(c))
                    .unwrap_or_else(|| "Keine Bilder".to_string()),
                position: if total == 0 { 0 } else { pb.index() + 1 },
                total,
                mode: pb.mode(),
                paused: pb.is_paused(),
                interval_secs: pb.interval_secs(),
            }
        });

        FrameSnapshot {
            image: current.cloned(),
            border: self.overlay.border(now),
            menu,
            info,
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply one command.  Shared by voice and touch.
    pub fn apply(&mut self, command: Command, now: Instant) -> CommandOutcome {
        let outcome = match command {
            Command::Pause => {
                self.playback.set_paused(true, now);
                CommandOutcome::Applied
            }
            Command::Resume => {
                self.playback.set_paused(false, now);
                CommandOutcome::Applied
            }
            Command::TogglePlayback => {
                let paused = self.playback.is_paused();
                self.playback.set_paused(!paused, now);
                CommandOutcome::Applied
            }
            Command::Faster => {
                self.playback.faster();
                CommandOutcome::Applied
            }
            Command::Slower => {
                self.playback.slower();
                CommandOutcome::Applied
            }
            Command::Next => applied_if(self.playback.next(now), "playlist is empty"),
            Command::Previous => applied_if(self.playback.previous(now), "playlist is empty"),
            Command::Restart => {
                self.playback.restart(now);
                CommandOutcome::Applied
            }
            Command::GoTo(n) => applied_if(self.playback.go_to(n, now), "no image at that number"),
            Command::SaveFavorite => self.save_favorite(),
            Command::ToggleFavorite => self.toggle_favorite(now),
            Command::PlayFavorites => applied_if(
                self.playback.switch_mode(PlaylistMode::Favorites, now),
                "no favorites",
            ),
            Command::PlayAll => {
                self.reload_all();
                self.playback.switch_mode(PlaylistMode::All, now);
                CommandOutcome::Applied
            }
            Command::ToggleMode => {
                let target = self.playback.mode().toggled();
                if target == PlaylistMode::All {
                    self.reload_all();
                }
                applied_if(self.playback.switch_mode(target, now), "no favorites")
            }
            Command::DeleteCurrent => self.delete_current(now),
            Command::ShowInfo => {
                self.overlay.show_info(now);
                CommandOutcome::Applied
            }
            Command::Shutdown => CommandOutcome::Shutdown,
        };

        match &outcome {
            CommandOutcome::Rejected(reason) => {
                log::info!("kiosk: {command:?} rejected: {reason}");
            }
            _ => log::debug!("kiosk: {command:?} → {outcome:?}"),
        }
        outcome
    }

    /// Rewrite the favorites file with the in-memory list.
    pub fn flush_favorites(&mut self) -> Result<(), LibraryError> {
        self.favorites.save(self.playback.favorites())
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn save_favorite(&mut self) -> CommandOutcome {
        let Some(current) = self.playback.current().cloned() else {
            return CommandOutcome::Rejected("no current image");
        };
        if !self.playback.add_favorite(current) {
            return CommandOutcome::Rejected("already a favorite");
        }
        self.persist_favorites();
        CommandOutcome::Applied
    }

    fn toggle_favorite(&mut self, now: Instant) -> CommandOutcome {
        let Some(current) = self.playback.current().cloned() else {
            return CommandOutcome::Rejected("no current image");
        };
        if self.playback.is_favorite(&current) {
            self.playback.remove_favorite(&current, now);
        } else {
            self.playback.add_favorite(current);
        }
        self.persist_favorites();
        CommandOutcome::Applied
    }

    /// ALL mode deletes the file; FAVORITES mode only unfavorites.
    fn delete_current(&mut self, now: Instant) -> CommandOutcome {
        let Some(current) = self.playback.current().cloned() else {
            return CommandOutcome::Rejected("no current image");
        };
        match self.playback.mode() {
            PlaylistMode::All => {
                if let Err(e) = self.library.remove(&current) {
                    log::warn!("kiosk: {e}");
                }
                self.playback.remove_from_all(&current, now);
            }
            PlaylistMode::Favorites => {
                self.playback.remove_favorite(&current, now);
                self.persist_favorites();
            }
        }
        log::info!("kiosk: removed {}", current.display());
        CommandOutcome::Applied
    }

    fn reload_all(&mut self) {
        match self.library.list() {
            Ok(items) => self.playback.replace_all(items),
            Err(e) => log::warn!("kiosk: cannot list images, keeping previous list: {e}"),
        }
    }

    fn persist_favorites(&mut self) {
        if let Err(e) = self.favorites.save(self.playback.favorites()) {
            log::warn!("kiosk: favorites not saved: {e}");
        }
    }
}

fn applied_if(ok: bool, reason: &'static str) -> CommandOutcome {
    if ok {
        CommandOutcome::Applied
    } else {
        CommandOutcome::Rejected(reason)
    }
}

fn display_name(item: &Path) -> String {
    item.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| item.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
