//! Parameter types for avatar normalization.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! [`operations`](super::operations), which decides the geometry, and the
//! [`backend`](super::backend), which does the pixel work.

use super::calculations::CropWindow;
use serde::{Deserialize, Serialize};

/// How a decoded image is fitted into the output square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropPolicy {
    /// Centered square crop on the shorter edge, scaled to exactly
    /// `size × size`.
    #[default]
    Square,
    /// Scale down (never up) to fit inside `size × size`, keeping the aspect
    /// ratio. Output may be non-square.
    Thumbnail,
}

/// Output geometry for the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Edge length of the output square in pixels.
    pub size: u32,
    pub policy: CropPolicy,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            size: 256,
            policy: CropPolicy::Square,
        }
    }
}

/// A concrete render: optional crop, then resize to exactly `width × height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParams {
    pub crop: Option<CropWindow>,
    pub width: u32,
    pub height: u32,
}
