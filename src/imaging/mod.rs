//! Image processing: probing, tag reading, and JPEG resizing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::ImageReader::with_guessed_format` |
//! | **Tags** | `kamadak-exif` + in-crate IPTC parser |
//! | **Resize → JPEG** | Lanczos3 + `JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining records + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Probe, RasterFormat};
pub use calculations::{fit_within_box, thumbnail_widths};
pub use operations::{plan_rasters, write_rasters};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
