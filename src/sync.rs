//! Incremental output writing.
//!
//! Re-encoding every JPEG on every build is the slow part of a gallery
//! build. This module decides, per output file, whether the write can be
//! skipped.
//!
//! # Rules
//!
//! | Output | Written when |
//! |---|---|
//! | rasters (thumbnails, full-size copy) | `force`, destination missing, or source modified after the last run |
//! | text (HTML, JSON) | `force`, or content differs from what is on disk |
//!
//! A second build with unchanged sources therefore performs no writes.
//!
//! ## The last-run marker
//!
//! `<output>/.lastrun` is an empty file whose modification time records when
//! the last successful build started. It is written at the end of every
//! build, stamped with the time taken before the scan, so a source edited
//! mid-build is still newer than the marker next time. A missing marker
//! means "never built": every raster is written.
//!
//! ## Forcing
//!
//! Pass `--force-resync` to `build` to rewrite everything regardless.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Name of the last-run marker within the output directory.
pub const MARKER_FILENAME: &str = ".lastrun";

/// Modification time of the last-run marker, if a previous build finished.
pub fn last_run(output_dir: &Path) -> Option<SystemTime> {
    fs::metadata(marker_path(output_dir))
        .and_then(|m| m.modified())
        .ok()
}

/// Create or update the marker so its mtime is `started`.
pub fn touch_marker(output_dir: &Path, started: SystemTime) -> io::Result<()> {
    let file = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(marker_path(output_dir))?;
    file.set_modified(started)
}

pub fn marker_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MARKER_FILENAME)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Per-build decision rules for output files.
#[derive(Debug, Clone, Copy)]
pub struct WritePolicy {
    force: bool,
    last_run: Option<SystemTime>,
}

impl WritePolicy {
    pub fn new(force: bool, last_run: Option<SystemTime>) -> Self {
        Self { force, last_run }
    }

    /// Whether a raster derived from `source` must be (re)written to `dest`.
    ///
    /// An unreadable source mtime counts as modified.
    pub fn should_write_raster(&self, source: &Path, dest: &Path) -> bool {
        if self.force || !dest.exists() {
            return true;
        }
        let Some(last_run) = self.last_run else {
            return true;
        };
        match fs::metadata(source).and_then(|m| m.modified()) {
            Ok(modified) => modified > last_run,
            Err(_) => true,
        }
    }

    /// Write `content` to `dest` unless it is already there byte-for-byte.
    pub fn write_text(&self, dest: &Path, content: &str) -> io::Result<WriteOutcome> {
        if !self.force
            && let Ok(existing) = fs::read(dest)
            && existing == content.as_bytes()
        {
            return Ok(WriteOutcome::Unchanged);
        }
        fs::write(dest, content)?;
        Ok(WriteOutcome::Written)
    }
}

/// Counts of files written and left alone during a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    pub written: u32,
    pub unchanged: u32,
}

impl WriteStats {
    pub fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn merge(&mut self, other: WriteStats) {
        self.written += other.written;
        self.unchanged += other.unchanged;
    }

    pub fn total(&self) -> u32 {
        self.written + self.unchanged
    }
}

impl fmt::Display for WriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchanged > 0 {
            write!(
                f,
                "{} written, {} unchanged ({} total)",
                self.written,
                self.unchanged,
                self.total()
            )
        } else {
            write!(f, "{} written", self.written)
        }
    }
}
