//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `image::ImageReader::with_guessed_format` + `into_dimensions` |
//! | Decode (JPEG, PNG) | `image` crate (pure Rust decoders) |
//! | Resize | `fit_within_box` + `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | EXIF tags | `kamadak-exif` via [`crate::tags::ExifTags`] |
//! | IPTC tags | in-crate IIM parser via [`crate::tags::IptcTags`] |

use super::backend::{BackendError, Dimensions, ImageBackend, Probe, RasterFormat};
use super::calculations::fit_within_box;
use super::params::ResizeParams;
use crate::tags::{self, TagMap};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Identify the format from magic bytes only. `ImageReader::open` would
/// seed the guess from the extension, so the reader is built by hand.
fn sniff(path: &Path) -> Result<(RasterFormat, ImageReader<BufReader<File>>), BackendError> {
    let reader = ImageReader::new(BufReader::new(File::open(path)?)).with_guessed_format()?;
    let format = match reader.format() {
        Some(ImageFormat::Jpeg) => RasterFormat::Jpeg,
        Some(ImageFormat::Png) => RasterFormat::Png,
        Some(other) => {
            return Err(BackendError::UnsupportedFormat(format!(
                "{} is {other:?}",
                path.display()
            )));
        }
        None => {
            return Err(BackendError::UnsupportedFormat(format!(
                "{} is not a recognized image",
                path.display()
            )));
        }
    };
    Ok((format, reader))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let (_, reader) = sniff(path)?;
    reader.decode().map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    })
}

/// Encode as baseline JPEG. Alpha is dropped; JPEG has no alpha channel.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100) as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn probe(&self, path: &Path) -> Result<Probe, BackendError> {
        let (format, reader) = sniff(path)?;
        let (width, height) = reader.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Probe {
            format,
            dimensions: Dimensions { width, height },
        })
    }

    fn read_tags(&self, path: &Path) -> Result<TagMap, BackendError> {
        Ok(tags::read_tags(path))
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let out = match params.max_dimension {
            Some(max) => {
                let (w, h) = fit_within_box((img.width(), img.height()), max);
                if (w, h) == (img.width(), img.height()) {
                    img
                } else {
                    img.resize_exact(w, h, FilterType::Lanczos3)
                }
            }
            None => img,
        };
        save_jpeg(&out, &params.output, params.quality.value())
    }
}
