//! Letterboxing images into the fixed kiosk canvas.
//!
//! Aspect ratio is preserved; the scaled image is centred on a black canvas
//! of exactly the requested size.  An unreadable file yields a black canvas.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FitError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Placement of a `src_w`×`src_h` image inside a `dst_w`×`dst_h` canvas:
/// `(x, y, w, h)`.  Both scaled sides are at least one pixel.
pub fn letterbox(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return (0, 0, 0, 0);
    }
    let scale = f64::min(
        f64::from(dst_w) / f64::from(src_w),
        f64::from(dst_h) / f64::from(src_h),
    );
    let w = ((f64::from(src_w) * scale).round() as u32).clamp(1, dst_w);
    let h = ((f64::from(src_h) * scale).round() as u32).clamp(1, dst_h);
    ((dst_w - w) / 2, (dst_h - h) / 2, w, h)
}

/// A black `width`×`height` canvas.
pub fn blank(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
}

/// Scale `image` into a black `width`×`height` canvas, centred.
pub fn fit(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = blank(width, height);
    let (x, y, w, h) = letterbox(image.width(), image.height(), width, height);
    if w == 0 || h == 0 {
        return canvas;
    }
    let scaled = imageops::resize(&image.to_rgba8(), w, h, FilterType::Triangle);
    imageops::overlay(&mut canvas, &scaled, i64::from(x), i64::from(y));
    canvas
}

/// Read, decode and fit the image at `path`.
pub fn load_fitted(path: &Path, width: u32, height: u32) -> Result<RgbaImage, FitError> {
    let bytes = std::fs::read(path).map_err(|source| FitError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes)?;
    Ok(fit(&image, width, height))
}

/// [`load_fitted`], falling back to a black canvas.
pub fn load_or_blank(path: Option<&Path>, width: u32, height: u32) -> RgbaImage {
    let Some(path) = path else {
        return blank(width, height);
    };
    load_fitted(path, width, height).unwrap_or_else(|e| {
        log::warn!("render: {}: {e}", path.display());
        blank(width, height)
    })
}
