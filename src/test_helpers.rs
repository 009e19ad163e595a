//! Shared test utilities for the gravatar-gen test suite.
//!
//! Synthetic avatars are generated in memory with the `image` encoders so
//! tests never depend on fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::store::tests::MemoryStore;
//! use crate::test_helpers::*;
//!
//! let store = MemoryStore::new();
//! store.insert("avatar/carol.jpg", jpeg_bytes(200, 100));
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;

/// A gradient so that crops and scales produce distinguishable output.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Jpeg)
}

pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgba = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 8 % 256) as u8, (y * 8 % 256) as u8, 0, 255])
    });
    encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Gif)
}

// =========================================================================
// Assertions
// =========================================================================

/// Decode `bytes` and assert they are a PNG of the given size.
pub fn assert_png_of_size(bytes: &[u8], width: u32, height: u32) {
    assert_eq!(
        image::guess_format(bytes).ok(),
        Some(ImageFormat::Png),
        "expected PNG output"
    );
    let img = image::load_from_memory(bytes).unwrap();
    assert_eq!(
        (img.width(), img.height()),
        (width, height),
        "unexpected output dimensions"
    );
}
