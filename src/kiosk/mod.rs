//! Kiosk orchestration: the shared aggregate and the two loops driving it.
//!
//! # Architecture
//!
//! ```text
//!   egui update() ── TouchSender ──▶ TouchQueue
//!        │                               │
//!        ▼                               ▼
//!   RenderLoop::step  ──lock──▶  SharedKiosk (Arc<Mutex<Kiosk>>)  ◀──lock── VoiceLoop::run
//!        │                                                               (tokio task,
//!        ▼                                                                spawn_blocking listen)
//!   FrameSnapshot ──▶ display::FramePainter
//!
//!   ShutdownSignal ◀── ctrl_c / q key / window close / "ausschalten"
//! ```

pub mod render;
pub mod shutdown;
pub mod state;
pub mod voice;

pub use render::{touch_channel, RenderLoop, TouchQueue, TouchSender};
pub use shutdown::{ShutdownReason, ShutdownSignal};
pub use state::{
    lock_kiosk, CommandOutcome, FrameSnapshot, InfoSnapshot, Kiosk, MenuSnapshot, SharedKiosk,
};
pub use voice::VoiceLoop;
