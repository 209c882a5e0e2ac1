//! Playback model — playlists, cursor and pacing.
//!
//! This module is pure state: no clocks are read and no files are touched.
//! Callers pass `now` explicitly, which keeps every transition testable with
//! synthetic [`Instant`](std::time::Instant)s.

pub mod state;

pub use state::{ItemId, PlaybackState, PlaylistMode};
