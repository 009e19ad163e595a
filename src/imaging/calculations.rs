//! Pure calculation functions for avatar geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{CropPolicy, NormalizeConfig, RenderParams};

/// A rectangular region of the source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Centered square crop window sized to the shorter source edge.
///
/// The longer axis is trimmed equally on both sides. When the excess is odd
/// the extra pixel is trimmed from the right/bottom (offset is truncated).
///
/// # Examples
/// ```
/// # use gravatar_gen::imaging::{CropWindow, square_crop_window};
/// // 100x200 portrait → 100x100 window, 50 rows trimmed top and bottom
/// assert_eq!(
///     square_crop_window((100, 200)),
///     CropWindow { x: 0, y: 50, width: 100, height: 100 }
/// );
/// ```
pub fn square_crop_window(source: (u32, u32)) -> CropWindow {
    let (w, h) = source;
    let side = w.min(h);
    CropWindow {
        x: (w - side) / 2,
        y: (h - side) / 2,
        width: side,
        height: side,
    }
}

/// Dimensions that fit `source` inside a `max_edge` square without upscaling.
///
/// Aspect ratio is preserved; the longer edge becomes `max_edge`. Sources that
/// already fit are returned unchanged. Neither edge rounds below 1.
pub fn thumbnail_dimensions(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (w, h) = source;
    if w <= max_edge && h <= max_edge {
        return (w, h);
    }

    if w >= h {
        let scaled = (h as f64 * max_edge as f64 / w as f64).round() as u32;
        (max_edge, scaled.max(1))
    } else {
        let scaled = (w as f64 * max_edge as f64 / h as f64).round() as u32;
        (scaled.max(1), max_edge)
    }
}

/// Decide the crop and output size for a decoded source image.
pub fn plan_render(source: (u32, u32), config: &NormalizeConfig) -> RenderParams {
    match config.policy {
        CropPolicy::Square => RenderParams {
            crop: Some(square_crop_window(source)),
            width: config.size,
            height: config.size,
        },
        CropPolicy::Thumbnail => {
            let (width, height) = thumbnail_dimensions(source, config.size);
            RenderParams {
                crop: None,
                width,
                height,
            }
        }
    }
}
