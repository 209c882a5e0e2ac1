//! Frame composition: letterboxed image plus overlay, painted with egui.

pub mod fit;
pub mod painter;

pub use fit::{fit, letterbox, load_fitted, load_or_blank, FitError};
pub use painter::{CanvasTransform, FramePainter};
