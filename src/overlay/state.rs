//! Presentation state machine: menu, highlight, info overlay and feedback
//! borders.
//!
//! ```text
//!            touch                      touch on button
//!   Idle ───────────▶ MenuShown ──────────────────────────▶ MenuShown
//!    ▲                 │   │                                 (highlight armed)
//!    │ touch outside   │   │ idle timeout (no highlight)            │
//!    └─────────────────┘◀──┘◀───────────── highlight expired ───────┘
//!
//!   info visible: any touch only dismisses the info overlay
//! ```
//!
//! Nothing here touches the playlist; [`OverlayState`] only decides what the
//! next frame looks like and which button (if any) a touch pressed.

use std::time::{Duration, Instant};

use crate::config::OverlayConfig;

use super::deadline::Deadline;
use super::layout::ButtonId;

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

/// Durations driving the overlay transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayTimings {
    pub menu_idle: Duration,
    pub highlight: Duration,
    pub info: Duration,
    pub feedback: Duration,
}

impl Default for OverlayTimings {
    fn default() -> Self {
        Self::from(&OverlayConfig::default())
    }
}

impl From<&OverlayConfig> for OverlayTimings {
    fn from(cfg: &OverlayConfig) -> Self {
        Self {
            menu_idle: Duration::from_secs(cfg.menu_idle_secs),
            highlight: Duration::from_secs(cfg.highlight_secs),
            info: Duration::from_secs(cfg.info_secs),
            feedback: Duration::from_millis(cfg.feedback_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// BorderKind / TouchOutcome
// ---------------------------------------------------------------------------

/// Colored frame outline shown after voice activity.
///
/// Variants are declared in ascending priority; `Ord` is used to pick the
/// winner when several are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BorderKind {
    /// The wake phrase was heard.
    Hotword,
    /// A command was recognised and applied.
    Success,
    /// The command was not understood or had no effect.
    Fail,
}

/// What a single touch did to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// The info overlay was open; the touch closed it and nothing else.
    InfoDismissed,
    /// The menu was hidden; the touch revealed it.
    MenuOpened,
    /// The touch missed every button and hid the menu.
    MenuClosed,
    /// The touch pressed this button.  The caller runs its command.
    Pressed(ButtonId),
}

// ---------------------------------------------------------------------------
// OverlayState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OverlayState {
    timings: OverlayTimings,
    menu_visible: bool,
    highlighted: Option<ButtonId>,
    highlight: Deadline,
    last_interaction: Instant,
    info: Deadline,
    hotword: Deadline,
    success: Deadline,
    fail: Deadline,
}

impl OverlayState {
    pub fn new(timings: OverlayTimings, now: Instant) -> Self {
        Self {
            timings,
            menu_visible: false,
            highlighted: None,
            highlight: Deadline::expired(),
            last_interaction: now,
            info: Deadline::expired(),
            hotword: Deadline::expired(),
            success: Deadline::expired(),
            fail: Deadline::expired(),
        }
    }

    pub fn is_menu_visible(&self) -> bool {
        self.menu_visible
    }

    pub fn highlighted(&self) -> Option<ButtonId> {
        self.highlighted
    }

    /// Info overlay visibility.  Stays `true` until [`expire`](Self::expire)
    /// or a touch clears it.
    pub fn is_info_visible(&self) -> bool {
        self.info.is_armed()
    }

    // -----------------------------------------------------------------------
    // Touch
    // -----------------------------------------------------------------------

    /// Feed one touch.  `hit` is the hit-test result for the touch position;
    /// it is ignored unless the menu is already showing.
    pub fn on_touch(&mut self, hit: Option<ButtonId>, now: Instant) -> TouchOutcome {
        if self.info.is_armed() {
            self.info.clear();
            return TouchOutcome::InfoDismissed;
        }

        if !self.menu_visible {
            self.menu_visible = true;
            self.last_interaction = now;
            return TouchOutcome::MenuOpened;
        }

        match hit {
            Some(button) => {
                self.highlighted = Some(button);
                self.highlight.arm(now, self.timings.highlight);
                self.last_interaction = now;
                TouchOutcome::Pressed(button)
            }
            None => {
                self.hide_menu();
                TouchOutcome::MenuClosed
            }
        }
    }

    /// Show the info overlay for the configured lifetime.
    pub fn show_info(&mut self, now: Instant) {
        self.info.arm(now, self.timings.info);
    }

    // -----------------------------------------------------------------------
    // Feedback borders
    // -----------------------------------------------------------------------

    /// Arm the feedback border of `kind` for the configured lifetime.
    pub fn flash(&mut self, kind: BorderKind, now: Instant) {
        let feedback = self.timings.feedback;
        match kind {
            BorderKind::Hotword => self.hotword.arm(now, feedback),
            BorderKind::Success => self.success.arm(now, feedback),
            BorderKind::Fail => self.fail.arm(now, feedback),
        }
    }

    /// The border to draw at `now`: fail over success over hotword.
    pub fn border(&self, now: Instant) -> Option<BorderKind> {
        [
            (BorderKind::Hotword, &self.hotword),
            (BorderKind::Success, &self.success),
            (BorderKind::Fail, &self.fail),
        ]
        .into_iter()
        .filter(|(_, deadline)| deadline.is_live(now))
        .map(|(kind, _)| kind)
        .max()
    }

    // -----------------------------------------------------------------------
    // Expiry
    // -----------------------------------------------------------------------

    /// Apply every time-based transition that is due at `now`.  Called once
    /// per render tick.
    pub fn expire(&mut self, now: Instant) {
        if self.info.has_fired(now) {
            self.info.clear();
        }

        if !self.menu_visible {
            return;
        }
        if self.highlight.is_armed() {
            if self.highlight.has_fired(now) {
                self.hide_menu();
            }
        } else if now.saturating_duration_since(self.last_interaction) >= self.timings.menu_idle {
            self.hide_menu();
        }
    }

    fn hide_menu(&mut self) {
        self.menu_visible = false;
        self.highlighted = None;
        self.highlight.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
