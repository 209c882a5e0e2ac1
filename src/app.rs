//! Photo kiosk — egui/eframe application.
//!
//! # Architecture
//!
//! [`KioskApp`] is the top-level [`eframe::App`].  Each frame it:
//!
//! 1. Turns keyboard / window events into a shutdown request (`q`, close).
//! 2. Forwards pointer presses, mapped to canvas pixels, to the
//!    [`TouchSender`].
//! 3. Calls [`RenderLoop::step`]; `None` closes the window.
//! 4. Syncs the image texture and paints the [`FrameSnapshot`] outside the
//!    kiosk lock.
//! 5. Schedules the next frame after `display.tick_ms`.
//!
//! The voice loop runs on the tokio runtime and talks to the same
//! [`SharedKiosk`](crate::kiosk::SharedKiosk); the app never waits on it.

use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::DisplayConfig;
use crate::display::{CanvasTransform, FramePainter};
use crate::kiosk::{FrameSnapshot, RenderLoop, ShutdownReason, TouchSender};
use crate::overlay::ButtonLayout;

pub struct KioskApp {
    render: RenderLoop,
    touches: TouchSender,
    painter: FramePainter,
    layout: ButtonLayout,
    width: u32,
    height: u32,
    tick: Duration,
    closing: bool,
}

impl KioskApp {
    pub fn new(render: RenderLoop, touches: TouchSender, display: &DisplayConfig) -> Self {
        Self {
            render,
            touches,
            painter: FramePainter::new(display.width, display.height),
            layout: ButtonLayout::for_canvas(display.width, display.height),
            width: display.width,
            height: display.height,
            tick: Duration::from_millis(display.tick_ms.max(1)),
            closing: false,
        }
    }

    // ── Input ────────────────────────────────────────────────────────────

    fn poll_input(&self, ctx: &egui::Context, tf: &CanvasTransform) {
        let (quit, close, presses) = ctx.input(|i| {
            let presses: Vec<egui::Pos2> = i
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::PointerButton {
                        pos,
                        button: egui::PointerButton::Primary,
                        pressed: true,
                        ..
                    } => Some(*pos),
                    _ => None,
                })
                .collect();
            (
                i.key_pressed(egui::Key::Q),
                i.viewport().close_requested(),
                presses,
            )
        });

        if (quit || close) && self.render.shutdown().request(ShutdownReason::Operator) {
            log::info!("render: operator requested exit");
        }
        for pos in presses {
            self.touches.push(tf.to_canvas(pos));
        }
    }

    fn paint(&mut self, ctx: &egui::Context, tf: &CanvasTransform, frame: &FrameSnapshot) {
        self.painter.sync_texture(ctx, frame.image.as_ref());

        let panel = egui::Frame::new().fill(egui::Color32::BLACK);
        egui::CentralPanel::default().frame(panel).show(ctx, |ui| {
            self.painter.paint(ui.painter(), tf, frame, &self.layout);
        });
    }
}

impl eframe::App for KioskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let tf = CanvasTransform::new(ctx.screen_rect(), self.width, self.height);
        self.poll_input(ctx, &tf);

        match self.render.step(Instant::now()) {
            Some(frame) => {
                self.paint(ctx, &tf, &frame);
                ctx.request_repaint_after(self.tick);
            }
            None => {
                if !self.closing {
                    log::info!("render: closing window ({:?})", self.render.shutdown().reason());
                    self.closing = true;
                }
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.render.shutdown().request(ShutdownReason::Operator);
    }
}
