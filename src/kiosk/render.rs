//! Render-side half of the kiosk loop.
//!
//! The UI thread calls [`RenderLoop::step`] once per frame:
//!
//! ```text
//!   shutdown? ──yes──▶ None (close window)
//!      │no
//!      ▼
//!   lock ─▶ expire timers + advance ─▶ one pending touch ─▶ snapshot ─▶ unlock
//!      │
//!      ▼
//!   Some(FrameSnapshot)   (decode + paint happen outside the lock)
//! ```
//!
//! Touches arrive through a [`TouchSender`] and are drained one per frame so
//! a burst of taps cannot starve the tick.

use std::time::Instant;

use tokio::sync::mpsc;

use crate::overlay::TouchPoint;

use super::shutdown::ShutdownSignal;
use super::state::{lock_kiosk, FrameSnapshot, SharedKiosk};

// ---------------------------------------------------------------------------
// Touch queue
// ---------------------------------------------------------------------------

/// Producer side; cheap to clone, usable from any thread.
#[derive(Debug, Clone)]
pub struct TouchSender {
    tx: mpsc::UnboundedSender<TouchPoint>,
}

impl TouchSender {
    pub fn push(&self, point: TouchPoint) {
        // The receiver lives as long as the render loop; after that touches
        // have nowhere to go.
        let _ = self.tx.send(point);
    }
}

/// Consumer side, polled by the render loop.
#[derive(Debug)]
pub struct TouchQueue {
    rx: mpsc::UnboundedReceiver<TouchPoint>,
}

impl TouchQueue {
    pub fn pop(&mut self) -> Option<TouchPoint> {
        self.rx.try_recv().ok()
    }
}

pub fn touch_channel() -> (TouchSender, TouchQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TouchSender { tx }, TouchQueue { rx })
}

// ---------------------------------------------------------------------------
// RenderLoop
// ---------------------------------------------------------------------------

pub struct RenderLoop {
    kiosk: SharedKiosk,
    touches: TouchQueue,
    shutdown: ShutdownSignal,
}

impl RenderLoop {
    pub fn new(kiosk: SharedKiosk, touches: TouchQueue, shutdown: ShutdownSignal) -> Self {
        Self {
            kiosk,
            touches,
            shutdown,
        }
    }

    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    pub fn kiosk(&self) -> &SharedKiosk {
        &self.kiosk
    }

    /// One frame of work.  `None` once shutdown has been requested.
    pub fn step(&mut self, now: Instant) -> Option<FrameSnapshot> {
        if self.shutdown.is_requested() {
            return None;
        }
        let touch = self.touches.pop();

        let mut kiosk = lock_kiosk(&self.kiosk);
        kiosk.tick(now);
        if let Some(point) = touch {
            kiosk.handle_touch(point, now);
        }
        Some(kiosk.snapshot(now))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::AppConfig;
    use crate::kiosk::{Kiosk, ShutdownReason};
    use crate::library::{MockFavorites, MockLibrary};
    use crate::overlay::ButtonId;
    use crate::playback::ItemId;

    fn setup(now: Instant) -> (RenderLoop, TouchSender, SharedKiosk, ShutdownSignal) {
        let kiosk = Kiosk::new(
            Box::new(MockLibrary::with(&["A", "B", "C"])),
            Box::new(MockFavorites::default()),
            &AppConfig::default(),
            now,
        )
        .into_shared();
        let (tx, queue) = touch_channel();
        let shutdown = ShutdownSignal::new();
        let render = RenderLoop::new(kiosk.clone(), queue, shutdown.clone());
        (render, tx, kiosk, shutdown)
    }

    fn next_button(kiosk: &SharedKiosk) -> TouchPoint {
        let r = lock_kiosk(kiosk).layout().rect(ButtonId::Next);
        TouchPoint::new(r.x + 1.0, r.y + 1.0)
    }

    #[test]
    fn step_advances_slideshow() {
        let t0 = Instant::now();
        let (mut render, _tx, _kiosk, _) = setup(t0);

        let frame = render.step(t0 + Duration::from_secs(10)).expect("frame");
        assert_eq!(frame.image, Some(ItemId::from("B")));
    }

    #[test]
    fn touches_are_processed_one_per_step() {
        let t0 = Instant::now();
        let (mut render, tx, kiosk, _) = setup(t0);
        let p = next_button(&kiosk);
        tx.push(p);
        tx.push(p);
        tx.push(p);

        let first = render.step(t0).expect("frame");
        assert!(first.menu.is_some());
        assert_eq!(first.image, Some(ItemId::from("A")));

        assert_eq!(render.step(t0).expect("frame").image, Some(ItemId::from("B")));
        assert_eq!(render.step(t0).expect("frame").image, Some(ItemId::from("C")));
        assert!(render.touches.pop().is_none());
    }

    #[test]
    fn step_stops_after_shutdown() {
        let t0 = Instant::now();
        let (mut render, _tx, _kiosk, shutdown) = setup(t0);
        shutdown.request(ShutdownReason::Operator);
        assert!(render.step(t0).is_none());
    }

    #[test]
    fn menu_hides_after_idle_step() {
        let t0 = Instant::now();
        let (mut render, tx, _kiosk, _) = setup(t0);
        tx.push(TouchPoint::new(5.0, 5.0));
        assert!(render.step(t0).expect("frame").menu.is_some());
        assert!(render
            .step(t0 + Duration::from_secs(5))
            .expect("frame")
            .menu
            .is_none());
    }

    #[test]
    fn sender_works_from_another_thread() {
        let t0 = Instant::now();
        let (mut render, tx, _kiosk, _) = setup(t0);
        std::thread::spawn(move || tx.push(TouchPoint::new(5.0, 5.0)))
            .join()
            .expect("join");
        assert!(render.step(t0).expect("frame").menu.is_some());
    }
}
