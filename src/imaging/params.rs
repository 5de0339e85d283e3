//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which decides which
//! rasters an image needs, and the [`backend`](super::backend), which does the
//! pixel work. A mock backend can then record them without touching pixels.

use std::path::PathBuf;

/// JPEG encoding quality (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Parameters for a resize-and-encode operation.
///
/// The output is always JPEG. `max_dimension` bounds both sides: the image
/// is scaled to fit inside a `max_dimension` square, keeping its aspect
/// ratio and never upscaling. `None` re-encodes at native size.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub max_dimension: Option<u32>,
    pub quality: Quality,
}
