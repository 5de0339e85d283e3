//! High-level image operations.
//!
//! These functions turn an [`ImageRecord`]'s plan into concrete
//! [`ResizeParams`] and run them through a backend.

use super::backend::{BackendError, ImageBackend};
use super::params::{Quality, ResizeParams};
use crate::record::ImageRecord;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Every raster an image needs: its planned thumbnails, then the full-size copy.
pub fn plan_rasters(record: &ImageRecord, images_dir: &Path, quality: Quality) -> Vec<ResizeParams> {
    let source = record.source_path();
    record
        .thumbnails()
        .iter()
        .map(|plan| ResizeParams {
            source: source.to_path_buf(),
            output: plan.path.clone(),
            max_dimension: Some(plan.width),
            quality,
        })
        .chain(std::iter::once(ResizeParams {
            source: source.to_path_buf(),
            output: images_dir.join(record.full_size_name()),
            max_dimension: None,
            quality,
        }))
        .collect()
}

/// Run the raster operations that `should_write` selects.
///
/// Returns the number of files written. Stops at the first backend error.
pub fn write_rasters(
    backend: &impl ImageBackend,
    rasters: &[ResizeParams],
    mut should_write: impl FnMut(&ResizeParams) -> bool,
) -> Result<usize> {
    let mut written = 0;
    for params in rasters {
        if !should_write(params) {
            continue;
        }
        backend.resize(params)?;
        written += 1;
    }
    Ok(written)
}
