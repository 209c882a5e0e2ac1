//! The playback model: two playlists, a cursor, and the pacing clock.
//!
//! [`PlaybackState`] owns both ordered sequences (ALL and FAVORITES) and the
//! cursor into whichever one is active.  Every method that can shift or
//! shrink the active playlist re-synchronises `index` and `current` before
//! returning, so callers never observe a dangling cursor:
//!
//! * active playlist non-empty ⇒ `index < len` and `current == active[index]`
//! * active playlist empty     ⇒ `current == None`
//!
//! The type does no I/O.  Persisting favorites and deleting files is the job
//! of the [`Kiosk`](crate::kiosk::Kiosk) aggregate that wraps it.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Identifier of one image — its path in the image pool.
pub type ItemId = PathBuf;

// ---------------------------------------------------------------------------
// PlaylistMode
// ---------------------------------------------------------------------------

/// Which playlist drives the slideshow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaylistMode {
    /// Every image in the pool.
    #[default]
    All,
    /// Only the persisted favorites.
    Favorites,
}

impl PlaylistMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            PlaylistMode::All => PlaylistMode::Favorites,
            PlaylistMode::Favorites => PlaylistMode::All,
        }
    }

    /// Short label for the info overlay.
    pub fn label(self) -> &'static str {
        match self {
            PlaylistMode::All => "Alle Bilder",
            PlaylistMode::Favorites => "Favoriten",
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// Playlists, cursor, pause flag and interval.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    all: Vec<ItemId>,
    favorites: Vec<ItemId>,
    mode: PlaylistMode,
    index: usize,
    current: Option<ItemId>,
    paused: bool,
    interval_secs: u64,
    last_advance: Instant,
}

impl PlaybackState {
    /// Start in ALL mode at the first image.
    ///
    /// `interval_secs` is clamped to at least 1.
    pub fn new(all: Vec<ItemId>, favorites: Vec<ItemId>, interval_secs: u64, now: Instant) -> Self {
        let mut state = Self {
            all,
            favorites,
            mode: PlaylistMode::All,
            index: 0,
            current: None,
            paused: false,
            interval_secs: interval_secs.max(1),
            last_advance: now,
        };
        state.resync();
        state
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The playlist selected by [`mode`](Self::mode).
    pub fn active(&self) -> &[ItemId] {
        match self.mode {
            PlaylistMode::All => &self.all,
            PlaylistMode::Favorites => &self.favorites,
        }
    }

    pub fn all(&self) -> &[ItemId] {
        &self.all
    }

    pub fn favorites(&self) -> &[ItemId] {
        &self.favorites
    }

    pub fn mode(&self) -> PlaylistMode {
        self.mode
    }

    /// Cursor into the active playlist.  Meaningless when it is empty.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&ItemId> {
        self.current.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Whether `item` is in the favorites list.
    pub fn is_favorite(&self, item: &ItemId) -> bool {
        self.favorites.contains(item)
    }

    // -----------------------------------------------------------------------
    // Pacing
    // -----------------------------------------------------------------------

    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if self.paused && !paused {
            self.last_advance = now;
        }
        self.paused = paused;
    }

    /// Shorten the interval by one second, never below 1.
    pub fn faster(&mut self) {
        self.interval_secs = self.interval_secs.saturating_sub(1).max(1);
    }

    /// Lengthen the interval by one second.
    pub fn slower(&mut self) {
        self.interval_secs = self.interval_secs.saturating_add(1);
    }

    /// Advance by one image if the interval has elapsed and playback is not
    /// paused.  Returns `true` when the cursor moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.paused || self.active().is_empty() {
            self.resync();
            return false;
        }
        let due = now.saturating_duration_since(self.last_advance)
            >= Duration::from_secs(self.interval_secs);
        if !due {
            return false;
        }
        self.index = (self.index + 1) % self.active().len();
        self.resync();
        self.last_advance = now;
        true
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Step forward with wrap-around.  `false` on an empty playlist.
    pub fn next(&mut self, now: Instant) -> bool {
        let len = self.active().len();
        if len == 0 {
            return false;
        }
        self.index = (self.index + 1) % len;
        self.moved(now);
        true
    }

    /// Step back with wrap-around.  `false` on an empty playlist.
    pub fn previous(&mut self, now: Instant) -> bool {
        let len = self.active().len();
        if len == 0 {
            return false;
        }
        self.index = (self.index + len - 1) % len;
        self.moved(now);
        true
    }

    /// Jump to the 1-based position `n`.  Leaves the state untouched and
    /// returns `false` unless `1 <= n <= len`.
    pub fn go_to(&mut self, n: usize, now: Instant) -> bool {
        let len = self.active().len();
        if n == 0 || n > len {
            return false;
        }
        self.index = n - 1;
        self.moved(now);
        true
    }

    /// Back to the first image and resume playback.
    pub fn restart(&mut self, now: Instant) {
        self.index = 0;
        self.paused = false;
        self.moved(now);
    }

    /// Switch playlists, resetting the cursor and resuming playback.
    ///
    /// Refuses (returns `false`) to enter FAVORITES while it is empty.
    pub fn switch_mode(&mut self, mode: PlaylistMode, now: Instant) -> bool {
        if mode == PlaylistMode::Favorites && self.favorites.is_empty() {
            return false;
        }
        self.mode = mode;
        self.index = 0;
        self.paused = false;
        self.moved(now);
        true
    }

    // -----------------------------------------------------------------------
    // Playlist mutation
    // -----------------------------------------------------------------------

    /// Replace the ALL playlist with a freshly listed pool.
    ///
    /// The cursor keeps pointing at the same image when it is still present;
    /// otherwise it is clamped back into range.
    pub fn replace_all(&mut self, items: Vec<ItemId>) {
        self.all = items;
        if self.mode == PlaylistMode::All {
            if let Some(pos) = self
                .current
                .as_ref()
                .and_then(|cur| self.all.iter().position(|i| i == cur))
            {
                self.index = pos;
            }
            self.resync();
        }
    }

    /// Append `item` to favorites.  `false` when it is already there.
    pub fn add_favorite(&mut self, item: ItemId) -> bool {
        if self.favorites.contains(&item) {
            return false;
        }
        self.favorites.push(item);
        true
    }

    /// Remove `item` from favorites.  `false` when it was not there.
    pub fn remove_favorite(&mut self, item: &ItemId, now: Instant) -> bool {
        let Some(pos) = self.favorites.iter().position(|i| i == item) else {
            return false;
        };
        self.favorites.remove(pos);
        if self.mode == PlaylistMode::Favorites {
            self.removed_at(pos, now);
        }
        true
    }

    /// Remove `item` from the ALL playlist.  `false` when it was not there.
    pub fn remove_from_all(&mut self, item: &ItemId, now: Instant) -> bool {
        let Some(pos) = self.all.iter().position(|i| i == item) else {
            return false;
        };
        self.all.remove(pos);
        if self.mode == PlaylistMode::All {
            self.removed_at(pos, now);
        }
        true
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Fix the cursor after the active playlist lost the entry at `pos`.
    ///
    /// Entries before the cursor shift it left; removing the current entry
    /// keeps the index so the next image slides in, wrapping to the start
    /// when the last one was removed.
    fn removed_at(&mut self, pos: usize, now: Instant) {
        let len = self.active().len();
        if pos < self.index {
            self.index -= 1;
        } else if pos == self.index {
            self.last_advance = now;
        }
        if len > 0 {
            self.index %= len;
        } else {
            self.index = 0;
        }
        self.resync();
    }

    fn moved(&mut self, now: Instant) {
        self.last_advance = now;
        self.resync();
    }

    fn resync(&mut self) {
        let len = self.active().len();
        if len == 0 {
            self.index = 0;
            self.current = None;
            return;
        }
        if self.index >= len {
            self.index = len - 1;
        }
        self.current = Some(self.active()[self.index].clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
