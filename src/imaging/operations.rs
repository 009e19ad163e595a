//! High-level avatar normalization.
//!
//! Combines the geometry in [`calculations`](super::calculations) with a
//! backend: decode → plan → render → encode. Codec failures never escape;
//! they turn into [`NormalizedImage::PassThrough`] carrying the original
//! bytes and the reason.

use super::backend::{BackendError, ImageBackend};
use super::calculations::plan_render;
use super::params::NormalizeConfig;
use image::ImageFormat;
use std::fmt;

/// Why the normalizer fell back to the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassThroughReason {
    Decode(String),
    Encode(String),
}

impl fmt::Display for PassThroughReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassThroughReason::Decode(e) => write!(f, "decode failed: {e}"),
            PassThroughReason::Encode(e) => write!(f, "encode failed: {e}"),
        }
    }
}

impl From<BackendError> for PassThroughReason {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode(e) => PassThroughReason::Decode(e),
            BackendError::Encode(e) => PassThroughReason::Encode(e),
        }
    }
}

/// Output of the normalizer for one source asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedImage {
    /// Re-encoded PNG thumbnail.
    Normalized {
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        source_format: Option<ImageFormat>,
    },
    /// The input bytes, unchanged.
    PassThrough {
        bytes: Vec<u8>,
        reason: PassThroughReason,
    },
}

impl NormalizedImage {
    pub fn bytes(&self) -> &[u8] {
        match self {
            NormalizedImage::Normalized { bytes, .. } => bytes,
            NormalizedImage::PassThrough { bytes, .. } => bytes,
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, NormalizedImage::PassThrough { .. })
    }
}

/// Normalize raw avatar bytes to the configured square PNG.
///
/// Takes ownership of `raw` so the pass-through path returns it without a copy.
pub fn normalize(
    backend: &impl ImageBackend,
    raw: Vec<u8>,
    config: &NormalizeConfig,
) -> NormalizedImage {
    match render_png(backend, &raw, config) {
        Ok((bytes, width, height, source_format)) => NormalizedImage::Normalized {
            bytes,
            width,
            height,
            source_format,
        },
        Err(err) => NormalizedImage::PassThrough {
            bytes: raw,
            reason: err.into(),
        },
    }
}

fn render_png(
    backend: &impl ImageBackend,
    raw: &[u8],
    config: &NormalizeConfig,
) -> Result<(Vec<u8>, u32, u32, Option<ImageFormat>), BackendError> {
    let decoded = backend.decode(raw)?;
    let dims = decoded.dimensions();
    let params = plan_render((dims.width, dims.height), config);
    let rendered = backend.render(&decoded.image, &params);
    let bytes = backend.encode(&rendered)?;
    Ok((bytes, rendered.width(), rendered.height(), decoded.format))
}
