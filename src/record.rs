//! Per-image lifecycle.
//!
//! ```text
//! Discovered ─admit─▶ Admitted ─resolve─▶ MetadataResolved ─plan─▶ ThumbnailsPlanned ─render─▶ Rendered
//!      │                  │                      │                        │
//!      └──────────────────┴──────────skip────────┴────────────────────────┴──▶ Skipped(reason)
//! ```
//!
//! Transitions are checked at runtime: calling one out of order returns
//! [`RecordError::InvalidTransition`] and leaves the record untouched.
//! `Rendered` and `Skipped` are terminal.

use crate::imaging::{Dimensions, Probe, thumbnail_widths};
use crate::metadata::{ExtractError, ImageMetadata};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an image was left out of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnsupportedFormat,
    Ineligible,
    NoDateFound,
    MalformedDate,
    MalformedCoordinate,
    /// Another source already claimed this base name (`a.jpg` vs `a.png`).
    DuplicateBaseName,
    /// The page name would overwrite a site-level page (`index.jpg`).
    ReservedName,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::UnsupportedFormat => "unsupported format",
            SkipReason::Ineligible => "no GPS position",
            SkipReason::NoDateFound => "no capture date",
            SkipReason::MalformedDate => "malformed capture date",
            SkipReason::MalformedCoordinate => "malformed GPS coordinate",
            SkipReason::DuplicateBaseName => "duplicate base name",
            SkipReason::ReservedName => "name reserved for the site index",
        };
        f.write_str(s)
    }
}

impl From<&ExtractError> for SkipReason {
    fn from(e: &ExtractError) -> Self {
        match e {
            ExtractError::MalformedCoordinate(_) => SkipReason::MalformedCoordinate,
            ExtractError::NoDateFound => SkipReason::NoDateFound,
            ExtractError::MalformedDate(_) => SkipReason::MalformedDate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovered,
    Admitted,
    MetadataResolved,
    ThumbnailsPlanned,
    Rendered,
    Skipped(SkipReason),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Discovered => f.write_str("discovered"),
            Stage::Admitted => f.write_str("admitted"),
            Stage::MetadataResolved => f.write_str("metadata-resolved"),
            Stage::ThumbnailsPlanned => f.write_str("thumbnails-planned"),
            Stage::Rendered => f.write_str("rendered"),
            Stage::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("cannot {action} a record in stage {from}")]
    InvalidTransition { from: Stage, action: &'static str },
}

/// One planned thumbnail: `<base_name>_<width>.jpg` in the images directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailPlan {
    pub width: u32,
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ImageRecord {
    source_path: PathBuf,
    base_name: String,
    stage: Stage,
    dimensions: Option<Dimensions>,
    metadata: Option<ImageMetadata>,
    thumbnails: Vec<ThumbnailPlan>,
}

impl ImageRecord {
    pub fn discover(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let base_name = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source_path,
            base_name,
            stage: Stage::Discovered,
            dimensions: None,
            metadata: None,
            thumbnails: Vec::new(),
        }
    }

    fn expect_stage(&self, expected: Stage, action: &'static str) -> Result<(), RecordError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(RecordError::InvalidTransition {
                from: self.stage,
                action,
            })
        }
    }

    /// `Discovered → Admitted`, recording native dimensions.
    pub fn admit(&mut self, probe: Probe) -> Result<(), RecordError> {
        self.expect_stage(Stage::Discovered, "admit")?;
        self.dimensions = Some(probe.dimensions);
        self.stage = Stage::Admitted;
        Ok(())
    }

    /// `Admitted → MetadataResolved`.
    pub fn resolve_metadata(&mut self, metadata: ImageMetadata) -> Result<(), RecordError> {
        self.expect_stage(Stage::Admitted, "resolve metadata for")?;
        self.metadata = Some(metadata);
        self.stage = Stage::MetadataResolved;
        Ok(())
    }

    /// `MetadataResolved → ThumbnailsPlanned`.
    ///
    /// One plan per requested width strictly below the native width.
    pub fn plan_thumbnails(&mut self, widths: &[u32], images_dir: &Path) -> Result<(), RecordError> {
        self.expect_stage(Stage::MetadataResolved, "plan thumbnails for")?;
        let native_width = self.dimensions.map(|d| d.width).unwrap_or(0);
        self.thumbnails = thumbnail_widths(native_width, widths)
            .into_iter()
            .map(|width| {
                let file_name = format!("{}_{}.jpg", self.base_name, width);
                ThumbnailPlan {
                    width,
                    path: images_dir.join(&file_name),
                    file_name,
                }
            })
            .collect();
        self.stage = Stage::ThumbnailsPlanned;
        Ok(())
    }

    /// `ThumbnailsPlanned → Rendered`.
    pub fn mark_rendered(&mut self) -> Result<(), RecordError> {
        self.expect_stage(Stage::ThumbnailsPlanned, "render")?;
        self.stage = Stage::Rendered;
        Ok(())
    }

    /// Move to `Skipped` from any non-terminal stage.
    pub fn skip(&mut self, reason: SkipReason) -> Result<(), RecordError> {
        match self.stage {
            Stage::Rendered | Stage::Skipped(_) => Err(RecordError::InvalidTransition {
                from: self.stage,
                action: "skip",
            }),
            _ => {
                self.stage = Stage::Skipped(reason);
                Ok(())
            }
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn metadata(&self) -> Option<&ImageMetadata> {
        self.metadata.as_ref()
    }

    pub fn thumbnails(&self) -> &[ThumbnailPlan] {
        &self.thumbnails
    }

    /// Full-size JPEG copy, relative to the images directory.
    pub fn full_size_name(&self) -> String {
        format!("{}.jpg", self.base_name)
    }

    /// Per-image HTML page, relative to the output root.
    pub fn page_name(&self) -> String {
        format!("{}.html", self.base_name)
    }
}
