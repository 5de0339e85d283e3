//! CLI output formatting.
//!
//! Output is information-first: each image leads with what it became (its
//! page and title), with the source file and write status as indented
//! context.
//!
//! ## Build
//!
//! ```text
//! Scanned: 3 planned, 2 skipped
//! skip IMG_0001.jpg (no GPS position)
//! skip notes.md (unsupported format)
//! IMG_0042.html  Ocean Beach
//!     thumbnails: 1024, 320
//!     files: 4 written
//! FAIL IMG_0050.jpg
//!     Processing failed: ...
//!
//! Pages:    2
//! Skipped:  2 (no GPS position: 1, unsupported format: 1)
//! Failed:   1
//! Files:    8 written, 3 unchanged (11 total)
//! ```
//!
//! Each `format_*` function returns `Vec<String>` so tests can check lines
//! without capturing stdout. The `print_*` wrappers write to stdout.

use crate::site::{BuildEvent, BuildReport, SiteBuildState};
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn join_widths(widths: &[u32]) -> String {
    widths
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Build progress
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::ScanFinished { planned, skipped } => {
            vec![format!("Scanned: {planned} planned, {skipped} skipped")]
        }
        BuildEvent::ImageSkipped {
            source_path,
            reason,
        } => vec![format!("skip {} ({})", file_name(source_path), reason)],
        BuildEvent::ImageRendered {
            page,
            title,
            thumbnails,
            writes,
        } => {
            let mut lines = vec![format!("{page}  {title}")];
            if thumbnails.is_empty() {
                lines.push(format!("{}thumbnails: none (source too small)", indent(1)));
            } else {
                lines.push(format!(
                    "{}thumbnails: {}",
                    indent(1),
                    join_widths(thumbnails)
                ));
            }
            lines.push(format!("{}files: {}", indent(1), writes));
            lines
        }
        BuildEvent::ImageFailed { source_path, error } => vec![
            format!("FAIL {}", file_name(source_path)),
            format!("{}{}", indent(1), error),
        ],
    }
}

/// Format the summary printed after a build.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Pages:    {}", report.pages.len()));

    let by_reason = report.skipped_by_reason();
    if by_reason.is_empty() {
        lines.push("Skipped:  0".to_string());
    } else {
        let detail = by_reason
            .iter()
            .map(|(reason, n)| format!("{reason}: {n}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Skipped:  {} ({})", report.skipped.len(), detail));
    }

    lines.push(format!("Failed:   {}", report.failed.len()));
    lines.push(format!("Files:    {}", report.writes));
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of scanning a source directory without building.
///
/// ```text
/// Images
///     IMG_0042.jpg  1600x1200  2019-08-04 12:28:53
///         37.500000, -122.000000
///         thumbnails: 1024, 320
///
/// Skipped
///     notes.md (unsupported format)
/// ```
pub fn format_check_output(state: &SiteBuildState<'_>) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Images".to_string());
    if state.images().is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for record in state.images() {
        let dims = record
            .dimensions()
            .map(|d| d.to_string())
            .unwrap_or_default();
        let Some(meta) = record.metadata() else {
            continue;
        };
        lines.push(format!(
            "{}{}  {}  {}",
            indent(1),
            file_name(record.source_path()),
            dims,
            meta.capture_timestamp
        ));
        lines.push(format!("{}{}, {}", indent(2), meta.latitude, meta.longitude));
        let widths: Vec<u32> = record.thumbnails().iter().map(|t| t.width).collect();
        if !widths.is_empty() {
            lines.push(format!("{}thumbnails: {}", indent(2), join_widths(&widths)));
        }
    }

    if !state.skipped().is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for s in state.skipped() {
            lines.push(format!(
                "{}{} ({})",
                indent(1),
                file_name(&s.source_path),
                s.reason
            ));
        }
    }

    if !state.failed().is_empty() {
        lines.push(String::new());
        lines.push("Failed".to_string());
        for f in state.failed() {
            lines.push(format!("{}{}: {}", indent(1), file_name(&f.source_path), f.error));
        }
    }

    lines
}

pub fn print_check_output(state: &SiteBuildState<'_>) {
    for line in format_check_output(state) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::imaging::backend::tests::MockBackend;
    use crate::record::SkipReason;
    use crate::site::{BuildConfig, FailedImage, SkippedImage, scan_source};
    use crate::sync::WriteStats;
    use crate::tags::TagMap;
    use crate::tags::fixtures::geotagged;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // =========================================================================
    // Events
    // =========================================================================

    #[test]
    fn skipped_event_shows_file_and_reason() {
        let lines = format_build_event(&BuildEvent::ImageSkipped {
            source_path: PathBuf::from("/photos/IMG_0001.jpg"),
            reason: SkipReason::Ineligible,
        });
        assert_eq!(lines, vec!["skip IMG_0001.jpg (no GPS position)"]);
    }

    #[test]
    fn rendered_event_lists_thumbnails_and_writes() {
        let lines = format_build_event(&BuildEvent::ImageRendered {
            page: "beach.html".to_string(),
            title: "Ocean Beach".to_string(),
            thumbnails: vec![1024, 320],
            writes: WriteStats {
                written: 4,
                unchanged: 0,
            },
        });
        assert_eq!(
            lines,
            vec![
                "beach.html  Ocean Beach",
                "    thumbnails: 1024, 320",
                "    files: 4 written",
            ]
        );
    }

    #[test]
    fn rendered_event_without_thumbnails() {
        let lines = format_build_event(&BuildEvent::ImageRendered {
            page: "tiny.html".to_string(),
            title: "tiny".to_string(),
            thumbnails: vec![],
            writes: WriteStats::default(),
        });
        assert_eq!(lines[1], "    thumbnails: none (source too small)");
    }

    #[test]
    fn failed_event_shows_error() {
        let lines = format_build_event(&BuildEvent::ImageFailed {
            source_path: PathBuf::from("/photos/bad.jpg"),
            error: "Processing failed: truncated".to_string(),
        });
        assert_eq!(lines, vec!["FAIL bad.jpg", "    Processing failed: truncated"]);
    }

    // =========================================================================
    // Report
    // =========================================================================

    #[test]
    fn report_summarises_skips_by_reason() {
        let report = BuildReport {
            pages: vec![],
            skipped: vec![
                SkippedImage {
                    source_path: "a.jpg".into(),
                    reason: SkipReason::Ineligible,
                },
                SkippedImage {
                    source_path: "b.md".into(),
                    reason: SkipReason::UnsupportedFormat,
                },
                SkippedImage {
                    source_path: "c.jpg".into(),
                    reason: SkipReason::Ineligible,
                },
            ],
            failed: vec![FailedImage {
                source_path: "d.jpg".into(),
                error: "boom".to_string(),
            }],
            writes: WriteStats {
                written: 2,
                unchanged: 1,
            },
        };

        let lines = format_build_report(&report);
        assert_eq!(lines[0], "Pages:    0");
        assert_eq!(
            lines[1],
            "Skipped:  3 (unsupported format: 1, no GPS position: 2)"
        );
        assert_eq!(lines[2], "Failed:   1");
        assert_eq!(lines[3], "Files:    2 written, 1 unchanged (3 total)");
    }

    #[test]
    fn report_without_skips() {
        let lines = format_build_report(&BuildReport::default());
        assert_eq!(lines[1], "Skipped:  0");
        assert_eq!(lines[3], "Files:    0 written");
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_output_lists_images_and_skips() {
        let tmp = TempDir::new().unwrap();
        for name in ["beach.jpg", "plain.jpg"] {
            std::fs::write(tmp.path().join(name), "x").unwrap();
        }
        let mut config = BuildConfig::new(tmp.path(), tmp.path().join("site"), &SiteConfig::default());
        config.widths = vec![1024, 320];
        let backend = MockBackend::new()
            .with_image("beach.jpg", 1600, 1200, geotagged())
            .with_image("plain.jpg", 800, 600, TagMap::new());

        let state = scan_source(&config, &backend, None, None).unwrap();
        let lines = format_check_output(&state);

        assert_eq!(lines[0], "Images");
        assert_eq!(lines[1], "    beach.jpg  1600x1200  2019-08-04 12:28:53");
        assert_eq!(lines[2], "        37.500000, -122.000000");
        assert_eq!(lines[3], "        thumbnails: 1024, 320");
        assert!(lines.contains(&"Skipped".to_string()));
        assert!(lines.contains(&"    plain.jpg (no GPS position)".to_string()));
    }
}
