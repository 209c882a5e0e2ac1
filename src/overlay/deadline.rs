//! One-shot presentation timers.

use std::time::{Duration, Instant};

/// Stand-in expiry for durations that overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A point in time after which some overlay element disappears.
///
/// A freshly created deadline is unarmed and reads as already expired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// An unarmed deadline.
    pub const fn expired() -> Self {
        Self { at: None }
    }

    /// Arm (or re-arm) the deadline to fire `duration` after `now`.  A
    /// duration too large for the clock fires a century from now instead.
    pub fn arm(&mut self, now: Instant, duration: Duration) {
        self.at = now
            .checked_add(duration)
            .or_else(|| now.checked_add(FAR_FUTURE));
    }

    /// `true` while `now` is strictly before the armed instant.
    pub fn is_live(&self, now: Instant) -> bool {
        self.at.is_some_and(|at| now < at)
    }

    /// `true` once an armed deadline has passed.  Unarmed deadlines are not
    /// "fired" — there is nothing pending.
    pub fn has_fired(&self, now: Instant) -> bool {
        self.at.is_some_and(|at| now >= at)
    }

    /// Whether the deadline has been armed and not cleared since.
    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    pub fn clear(&mut self) {
        self.at = None;
    }
}
