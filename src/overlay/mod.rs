//! Touch overlay — menu strip, highlight, info panel and feedback borders.
//!
//! * [`ButtonLayout`] maps a raw touch to one of the eight [`ButtonId`]s.
//! * [`OverlayState`] runs the time-based menu/info/border state machine.
//! * [`Deadline`] is the one-shot timer every transition is built from.

pub mod deadline;
pub mod layout;
pub mod state;

pub use deadline::Deadline;
pub use layout::{ButtonId, ButtonLayout, Rect, TouchPoint};
pub use state::{BorderKind, OverlayState, OverlayTimings, TouchOutcome};
