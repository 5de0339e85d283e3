//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the site builder
//! needs from an image library: probe, read_tags, and resize.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! recording `MockBackend` below.

use super::params::ResizeParams;
use crate::tags::TagMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Raster formats accepted as gallery sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Jpeg,
    Png,
}

/// Result of a probe: the sniffed format and the native size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub format: RasterFormat,
    pub dimensions: Dimensions,
}

/// Trait for image processing backends.
///
/// `probe` must identify the format from file content, not the extension, and
/// return [`BackendError::UnsupportedFormat`] for anything but JPEG or PNG.
pub trait ImageBackend: Sync {
    /// Sniff the format and read native dimensions without a full decode.
    fn probe(&self, path: &Path) -> Result<Probe, BackendError>;

    /// Read embedded EXIF and IPTC tags.
    fn read_tags(&self, path: &Path) -> Result<TagMap, BackendError>;

    /// Execute a resize-and-encode operation.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
