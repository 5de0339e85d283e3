//! Source directory discovery.
//!
//! The source root is flat: every regular file directly under it is a
//! candidate image. Subdirectories are not descended into.
//!
//! ```text
//! photos/                     # Source root
//! ├── config.toml             # Site configuration (optional, not a candidate)
//! ├── IMG_0042.jpg            # Candidate
//! ├── IMG_0042.txt            # Caption sidecar (not a candidate)
//! ├── harbor.png              # Candidate
//! ├── notes.md                # Candidate; rejected later by content sniffing
//! ├── .DS_Store               # Hidden, ignored
//! └── drafts/                 # Directory, ignored
//! ```
//!
//! Candidates are returned in file-name order so builds are deterministic.
//! Whether a candidate is really an image is decided later by content
//! sniffing, not by extension.

use crate::config::CONFIG_FILENAME;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of caption sidecar files.
pub const SIDECAR_EXTENSION: &str = "txt";

/// List candidate image files directly under `root`, sorted by file name.
pub fn discover(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || !is_candidate(entry.path()) {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

fn is_candidate(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    if name.starts_with('.') || name == CONFIG_FILENAME {
        return false;
    }
    let is_sidecar = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(SIDECAR_EXTENSION));
    !is_sidecar
}
