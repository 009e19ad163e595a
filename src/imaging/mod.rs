//! Avatar normalization in pure Rust, with no system image libraries.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with content sniffing |
//! | **Square crop** | [`square_crop_window`] + `crop_imm` |
//! | **Scale** | Lanczos3 `resize_exact` |
//! | **Encode** | PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop/scale geometry (unit testable)
//! - **Parameters**: Data structures describing the render
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`normalize`], combining calculations + backend with the
//!   pass-through fallback

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Decoded, Dimensions, ImageBackend};
pub use calculations::{CropWindow, plan_render, square_crop_window, thumbnail_dimensions};
pub use operations::{NormalizedImage, PassThroughReason, normalize};
pub use params::{CropPolicy, NormalizeConfig, RenderParams};
pub use rust_backend::RustBackend;
