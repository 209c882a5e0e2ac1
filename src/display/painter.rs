//! Painting a [`FrameSnapshot`] with egui.
//!
//! All geometry is computed in canvas pixels (the configured display size)
//! and mapped onto the window by [`CanvasTransform`], which letterboxes the
//! canvas the same way images are letterboxed into it.
//!
//! Draw order: image, menu strip, info panel, feedback border.

use eframe::egui;

use crate::kiosk::{FrameSnapshot, InfoSnapshot, MenuSnapshot};
use crate::overlay::{BorderKind, ButtonId, ButtonLayout, Rect, TouchPoint};
use crate::playback::{ItemId, PlaylistMode};

use super::fit;

const BORDER_WIDTH: f32 = 8.0;
const TEXTURE_NAME: &str = "kiosk-frame";

// ---------------------------------------------------------------------------
// CanvasTransform
// ---------------------------------------------------------------------------

/// Uniform scale + offset from canvas pixels to window points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    origin: egui::Pos2,
    scale: f32,
}

impl CanvasTransform {
    pub fn new(screen: egui::Rect, canvas_w: u32, canvas_h: u32) -> Self {
        let (cw, ch) = (canvas_w.max(1) as f32, canvas_h.max(1) as f32);
        let scale = (screen.width() / cw).min(screen.height() / ch);
        let origin = egui::pos2(
            screen.min.x + (screen.width() - cw * scale) / 2.0,
            screen.min.y + (screen.height() - ch * scale) / 2.0,
        );
        Self { origin, scale }
    }

    pub fn to_screen(&self, r: Rect) -> egui::Rect {
        egui::Rect::from_min_size(
            egui::pos2(self.origin.x + r.x * self.scale, self.origin.y + r.y * self.scale),
            egui::vec2(r.w * self.scale, r.h * self.scale),
        )
    }

    pub fn to_canvas(&self, p: egui::Pos2) -> TouchPoint {
        TouchPoint::new(
            (p.x - self.origin.x) / self.scale,
            (p.y - self.origin.y) / self.scale,
        )
    }

    fn scaled(&self, v: f32) -> f32 {
        v * self.scale
    }
}

// ---------------------------------------------------------------------------
// Colours and labels
// ---------------------------------------------------------------------------

pub fn border_color(kind: BorderKind) -> egui::Color32 {
    match kind {
        BorderKind::Hotword => egui::Color32::from_rgb(40, 120, 255),
        BorderKind::Success => egui::Color32::from_rgb(60, 200, 90),
        BorderKind::Fail => egui::Color32::from_rgb(230, 50, 50),
    }
}

/// Button caption, reflecting the current playback state where it matters.
pub fn button_label(button: ButtonId, menu: &MenuSnapshot) -> &'static str {
    match button {
        ButtonId::PlayPause if menu.paused => "▶",
        ButtonId::PlayPause => "⏸",
        ButtonId::FavoriteToggle if menu.favorite => "★",
        ButtonId::FavoriteToggle => "☆",
        ButtonId::ModeToggle => match menu.mode {
            PlaylistMode::All => "Alle",
            PlaylistMode::Favorites => "Fav",
        },
        other => other.glyph(),
    }
}

// ---------------------------------------------------------------------------
// FramePainter
// ---------------------------------------------------------------------------

/// Owns the image texture; re-decodes only when the current image changes.
pub struct FramePainter {
    width: u32,
    height: u32,
    texture: Option<egui::TextureHandle>,
    shown: Option<Option<ItemId>>,
}

impl FramePainter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texture: None,
            shown: None,
        }
    }

    /// Make the texture show `image`, decoding it if it changed.
    pub fn sync_texture(&mut self, ctx: &egui::Context, image: Option<&ItemId>) {
        if self.texture.is_some() && self.shown.as_ref().map(Option::as_ref) == Some(image) {
            return;
        }
        let rgba = fit::load_or_blank(image.map(|p| p.as_path()), self.width, self.height);
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

        match &mut self.texture {
            Some(handle) => handle.set(color, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture(TEXTURE_NAME, color, egui::TextureOptions::LINEAR));
            }
        }
        self.shown = Some(image.cloned());
    }

    pub fn paint(
        &self,
        painter: &egui::Painter,
        tf: &CanvasTransform,
        frame: &FrameSnapshot,
        layout: &ButtonLayout,
    ) {
        let canvas = Rect {
            x: 0.0,
            y: 0.0,
            w: self.width as f32,
            h: self.height as f32,
        };
        let canvas_rect = tf.to_screen(canvas);
        painter.rect_filled(painter.clip_rect(), 0.0, egui::Color32::BLACK);

        if let Some(texture) = &self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), canvas_rect, uv, egui::Color32::WHITE);
        }

        if let Some(menu) = &frame.menu {
            paint_menu(painter, tf, layout, menu);
        }
        if let Some(info) = &frame.info {
            paint_info(painter, tf, canvas, info);
        }
        if let Some(kind) = frame.border {
            paint_border(painter, canvas_rect, tf.scaled(BORDER_WIDTH), border_color(kind));
        }
    }
}

fn paint_menu(
    painter: &egui::Painter,
    tf: &CanvasTransform,
    layout: &ButtonLayout,
    menu: &MenuSnapshot,
) {
    for (button, rect) in layout.cells() {
        let r = tf.to_screen(*rect);
        let fill = if menu.highlighted == Some(*button) {
            egui::Color32::from_rgba_unmultiplied(255, 200, 40, 220)
        } else {
            egui::Color32::from_rgba_unmultiplied(20, 20, 20, 190)
        };
        painter.rect_filled(r, tf.scaled(6.0), fill);
        painter.text(
            r.center(),
            egui::Align2::CENTER_CENTER,
            button_label(*button, menu),
            egui::FontId::proportional(r.height() * 0.4),
            egui::Color32::WHITE,
        );
    }
}

fn paint_info(painter: &egui::Painter, tf: &CanvasTransform, canvas: Rect, info: &InfoSnapshot) {
    let panel = Rect {
        x: canvas.w * 0.2,
        y: canvas.h * 0.2,
        w: canvas.w * 0.6,
        h: canvas.h * 0.45,
    };
    let r = tf.to_screen(panel);
    painter.rect_filled(r, tf.scaled(10.0), egui::Color32::from_rgba_unmultiplied(0, 0, 0, 200));

    let lines = info.lines();
    let line_h = r.height() / (lines.len() as f32 + 1.0);
    for (i, line) in lines.iter().enumerate() {
        painter.text(
            egui::pos2(r.center().x, r.min.y + line_h * (i as f32 + 1.0)),
            egui::Align2::CENTER_CENTER,
            line,
            egui::FontId::proportional(line_h * 0.55),
            egui::Color32::from_rgb(230, 230, 230),
        );
    }
}

/// Four filled strips along the inside of `r`.
fn paint_border(painter: &egui::Painter, r: egui::Rect, width: f32, color: egui::Color32) {
    let w = width.min(r.width() / 2.0).min(r.height() / 2.0);
    let strips = [
        egui::Rect::from_min_max(r.min, egui::pos2(r.max.x, r.min.y + w)),
        egui::Rect::from_min_max(egui::pos2(r.min.x, r.max.y - w), r.max),
        egui::Rect::from_min_max(r.min, egui::pos2(r.min.x + w, r.max.y)),
        egui::Rect::from_min_max(egui::pos2(r.max.x - w, r.min.y), r.max),
    ];
    for strip in strips {
        painter.rect_filled(strip, 0.0, color);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(paused: bool, favorite: bool, mode: PlaylistMode) -> MenuSnapshot {
        MenuSnapshot {
            highlighted: None,
            paused,
            favorite,
            mode,
        }
    }

    #[test]
    fn transform_identity_when_window_matches_canvas() {
        let screen = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 480.0));
        let tf = CanvasTransform::new(screen, 800, 480);
        let p = tf.to_canvas(egui::pos2(123.0, 45.0));
        assert!((p.x - 123.0).abs() < 1e-4 && (p.y - 45.0).abs() < 1e-4);
    }

    #[test]
    fn transform_letterboxes_wider_window() {
        // 1600×480 window: canvas scaled ×1, centred with 400 px bars.
        let screen = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1600.0, 480.0));
        let tf = CanvasTransform::new(screen, 800, 480);

        let r = tf.to_screen(Rect {
            x: 0.0,
            y: 0.0,
            w: 800.0,
            h: 480.0,
        });
        assert!((r.min.x - 400.0).abs() < 1e-4);
        assert!((r.width() - 800.0).abs() < 1e-4);

        let p = tf.to_canvas(egui::pos2(410.0, 10.0));
        assert!((p.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn transform_round_trips_scaled_window() {
        let screen = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1920.0, 1080.0));
        let tf = CanvasTransform::new(screen, 800, 480);
        let r = tf.to_screen(Rect {
            x: 100.0,
            y: 50.0,
            w: 10.0,
            h: 10.0,
        });
        let back = tf.to_canvas(r.min);
        assert!((back.x - 100.0).abs() < 1e-3 && (back.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn fail_is_red() {
        let c = border_color(BorderKind::Fail);
        assert!(c.r() > c.g() && c.r() > c.b());
    }

    #[test]
    fn labels_follow_state() {
        let m = menu(true, false, PlaylistMode::All);
        assert_eq!(button_label(ButtonId::PlayPause, &m), "▶");
        assert_eq!(button_label(ButtonId::FavoriteToggle, &m), "☆");
        assert_eq!(button_label(ButtonId::ModeToggle, &m), "Alle");

        let m = menu(false, true, PlaylistMode::Favorites);
        assert_eq!(button_label(ButtonId::PlayPause, &m), "⏸");
        assert_eq!(button_label(ButtonId::FavoriteToggle, &m), "★");
        assert_eq!(button_label(ButtonId::ModeToggle, &m), "Fav");
        assert_eq!(button_label(ButtonId::Next, &m), ButtonId::Next.glyph());
    }
}
