//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff format | `ImageReader::with_guessed_format` (magic bytes, not extension) |
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image` crate decoders; GIF yields its first frame |
//! | Crop | `DynamicImage::crop_imm` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, Decoded, ImageBackend};
use super::params::RenderParams;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, BackendError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let format = reader.format();
        if format.is_none() {
            return Err(BackendError::Decode("unrecognized image format".into()));
        }
        let image = reader
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Decoded { image, format })
    }

    fn render(&self, image: &DynamicImage, params: &RenderParams) -> DynamicImage {
        let cropped = match params.crop {
            Some(win) => image.crop_imm(win.x, win.y, win.width, win.height),
            None => image.clone(),
        };
        if cropped.width() == params.width && cropped.height() == params.height {
            return cropped;
        }
        cropped.resize_exact(params.width, params.height, FilterType::Lanczos3)
    }

    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, BackendError> {
        let mut buf = Vec::new();
        image
            .write_with_encoder(PngEncoder::new(&mut buf))
            .map_err(|e| BackendError::Encode(format!("PNG encode failed: {e}")))?;
        Ok(buf)
    }
}
