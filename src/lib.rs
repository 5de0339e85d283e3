//! # geogal
//!
//! A static site generator for geotagged photos. Point it at a flat
//! directory of JPEG/PNG files; every image carrying a GPS position and a
//! capture date becomes a page with resized thumbnails, and an index lists
//! them all.
//!
//! # Pipeline
//!
//! ```text
//! discover ─▶ probe ─▶ read tags ─▶ extract ─▶ plan thumbnails ─▶ render
//!   scan      imaging    tags       metadata       record          site
//! ```
//!
//! Each source image is an [`record::ImageRecord`] that moves through a
//! checked lifecycle. Images that cannot be published are skipped with a
//! reason, never silently dropped.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geo`] | DMS rational triples + hemisphere → signed decimal degrees |
//! | [`tags`] | The `TagStore` capability; EXIF and IPTC readers |
//! | [`metadata`] | Tag store → `ImageMetadata`, with caption/headline fallbacks |
//! | [`record`] | Per-image lifecycle and skip reasons |
//! | [`imaging`] | `ImageBackend` trait: probe, read tags, resize to JPEG |
//! | [`render`] | Maud templates for image pages and the index |
//! | [`sync`] | Last-run marker and incremental write policy |
//! | [`scan`] | Candidate discovery in the source root |
//! | [`site`] | Build orchestration: scan phase, parallel render phase |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`output`] | CLI progress and summary formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## The hemisphere owns the sign
//!
//! Some writers store a negative degree numerator *and* a `W`/`S` reference.
//! Applying both would flip the point to the wrong side of the globe, so
//! [`geo::to_decimal_degrees`] uses component magnitudes and lets the
//! reference alone decide the sign.
//!
//! ## Content sniffing, not extensions
//!
//! Whether a file is an image is decided by its bytes. A `.jpg` that is
//! really a text file is skipped as unsupported; a PNG named `.dat` is
//! published.
//!
//! ## Incremental by default
//!
//! Encoding JPEGs dominates build time. Rasters are only re-encoded when the
//! source changed since the last run, and text outputs are only rewritten
//! when their content changed. A repeated build with no changes writes
//! nothing.

pub mod config;
pub mod geo;
pub mod imaging;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod record;
pub mod render;
pub mod scan;
pub mod site;
pub mod sync;
pub mod tags;

#[cfg(test)]
pub(crate) mod test_helpers;
