//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three steps every backend must
//! support: decode, render (crop + resize), and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests wrap it in a
//! recording mock that can also force encode failures.

use super::params::RenderParams;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded source image and the container format it was sniffed as.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

impl Decoded {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Decode raw bytes of unknown format. Animated formats yield the first frame.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded, BackendError>;

    /// Apply the crop (if any) and resize to exactly the requested size.
    fn render(&self, image: &DynamicImage, params: &RenderParams) -> DynamicImage;

    /// Encode to the canonical output format (PNG).
    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, BackendError>;
}
