//! Menu button geometry and touch hit-testing.
//!
//! The menu is a single strip of eight equal cells along the bottom edge of
//! the canvas:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                                                      │
//! │                       image                          │
//! │                                                      │
//! ├──────┬──────┬──────┬──────┬──────┬──────┬──────┬─────┤
//! │ -    │ |<   │ >/|| │ >|   │ +    │ fav  │ mode │ i   │
//! └──────┴──────┴──────┴──────┴──────┴──────┴──────┴─────┘
//! ```

/// Gap between adjacent cells and around the strip, in pixels.
const GAP: f32 = 8.0;
/// Smallest usable strip height.
const MIN_STRIP_HEIGHT: f32 = 48.0;

// ---------------------------------------------------------------------------
// ButtonId
// ---------------------------------------------------------------------------

/// The eight menu buttons, in left-to-right order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Slower,
    Previous,
    PlayPause,
    Next,
    Faster,
    FavoriteToggle,
    ModeToggle,
    Info,
}

impl ButtonId {
    /// Layout order.
    pub const ALL: [ButtonId; 8] = [
        ButtonId::Slower,
        ButtonId::Previous,
        ButtonId::PlayPause,
        ButtonId::Next,
        ButtonId::Faster,
        ButtonId::FavoriteToggle,
        ButtonId::ModeToggle,
        ButtonId::Info,
    ];

    /// Glyph drawn on the button.
    pub fn glyph(self) -> &'static str {
        match self {
            ButtonId::Slower => "−",
            ButtonId::Previous => "⏮",
            ButtonId::PlayPause => "⏯",
            ButtonId::Next => "⏭",
            ButtonId::Faster => "+",
            ButtonId::FavoriteToggle => "★",
            ButtonId::ModeToggle => "⇄",
            ButtonId::Info => "ℹ",
        }
    }
}

// ---------------------------------------------------------------------------
// TouchPoint / Rect
// ---------------------------------------------------------------------------

/// A raw touch or click position in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate by 180° inside a `width` × `height` display, for panels whose
    /// touch digitiser is mounted upside down.
    pub fn flipped(self, width: f32, height: f32) -> Self {
        Self {
            x: width - self.x,
            y: height - self.y,
        }
    }
}

/// Axis-aligned rectangle with inclusive min and exclusive max edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, p: TouchPoint) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

// ---------------------------------------------------------------------------
// ButtonLayout
// ---------------------------------------------------------------------------

/// Button rectangles for one canvas size.
#[derive(Debug, Clone)]
pub struct ButtonLayout {
    width: f32,
    height: f32,
    cells: [(ButtonId, Rect); 8],
}

impl ButtonLayout {
    /// Lay the strip out for a `width` × `height` canvas.
    pub fn for_canvas(width: u32, height: u32) -> Self {
        let (width, height) = (width as f32, height as f32);
        let strip_h = (height / 6.0).max(MIN_STRIP_HEIGHT).min(height);
        let cell_w = ((width - GAP * 9.0) / 8.0).max(1.0);
        let y = (height - strip_h - GAP).max(0.0);

        let cells = std::array::from_fn(|col| {
            let rect = Rect {
                x: GAP + col as f32 * (cell_w + GAP),
                y,
                w: cell_w,
                h: strip_h,
            };
            (ButtonId::ALL[col], rect)
        });

        Self {
            width,
            height,
            cells,
        }
    }

    /// Canvas size this layout was computed for.
    pub fn canvas(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Rectangles in layout order.
    pub fn cells(&self) -> &[(ButtonId, Rect)] {
        &self.cells
    }

    pub fn rect(&self, id: ButtonId) -> Rect {
        self.cells
            .iter()
            .find(|(b, _)| *b == id)
            .map(|(_, r)| *r)
            .unwrap_or(Rect {
                x: 0.0,
                y: 0.0,
                w: 0.0,
                h: 0.0,
            })
    }

    /// First button whose rectangle contains `p`, in layout order.
    pub fn hit_test(&self, p: TouchPoint) -> Option<ButtonId> {
        self.cells
            .iter()
            .find(|(_, rect)| rect.contains(p))
            .map(|(id, _)| *id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn centre(r: Rect) -> TouchPoint {
        TouchPoint::new(r.x + r.w / 2.0, r.y + r.h / 2.0)
    }

    #[test]
    fn every_button_hits_itself() {
        let layout = ButtonLayout::for_canvas(800, 480);
        for (id, rect) in layout.cells() {
            assert_eq!(layout.hit_test(centre(*rect)), Some(*id));
        }
    }

    #[test]
    fn cells_are_ordered_and_disjoint() {
        let layout = ButtonLayout::for_canvas(800, 480);
        let cells = layout.cells();
        for pair in cells.windows(2) {
            let (a, b) = (pair[0].1, pair[1].1);
            assert!(a.x + a.w <= b.x, "{:?} overlaps {:?}", pair[0].0, pair[1].0);
        }
        assert_eq!(cells[0].0, ButtonId::Slower);
        assert_eq!(cells[7].0, ButtonId::Info);
        let last = cells[7].1;
        assert!(last.x + last.w <= 800.0);
    }

    #[test]
    fn strip_sits_at_bottom() {
        let layout = ButtonLayout::for_canvas(800, 480);
        let r = layout.rect(ButtonId::Next);
        assert_eq!(r.h, 80.0);
        assert_eq!(r.y + r.h + GAP, 480.0);
    }

    #[test]
    fn image_area_and_gaps_miss() {
        let layout = ButtonLayout::for_canvas(800, 480);
        assert_eq!(layout.hit_test(TouchPoint::new(400.0, 100.0)), None);

        let a = layout.rect(ButtonId::Slower);
        let gap = TouchPoint::new(a.x + a.w + GAP / 2.0, a.y + 1.0);
        assert_eq!(layout.hit_test(gap), None);
    }

    #[test]
    fn flipped_maps_corners() {
        let p = TouchPoint::new(10.0, 20.0).flipped(800.0, 480.0);
        assert_eq!(p, TouchPoint::new(790.0, 460.0));
    }

    #[test]
    fn flipped_touch_hits_mirrored_button() {
        let layout = ButtonLayout::for_canvas(800, 480);
        let (w, h) = layout.canvas();
        // Top-right of an upside-down panel is the bottom-left cell.
        let physical = TouchPoint::new(750.0, 40.0);
        assert_eq!(layout.hit_test(physical), None);
        assert_eq!(
            layout.hit_test(physical.flipped(w, h)),
            Some(ButtonId::Slower)
        );
    }
}
