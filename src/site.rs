//! Site build orchestration.
//!
//! A build runs in two phases over a flat source directory:
//!
//! 1. **Scan** (sequential, file-name order). Every candidate is probed,
//!    its tags are read and extracted, and its thumbnails are planned. Images
//!    that cannot join the site are skipped with a [`SkipReason`].
//! 2. **Render** (rayon pool, `threads` wide). Each planned image writes its
//!    thumbnails, its full-size copy, and its HTML page. Images own disjoint
//!    output paths, so no coordination is needed between workers.
//!
//! The site-level outputs (`index.html`, `images.json`) are written last,
//! followed by the last-run marker. A source whose page would land on a
//! site-level name (`index.jpg`) is skipped as [`SkipReason::ReservedName`].
//! See [`crate::sync`] for which writes are skipped on incremental builds.
//!
//! A failure on one image (I/O, encoding) is logged and counted; it never
//! aborts the build. Only problems with the source or output roots are fatal.

use crate::config::SiteConfig;
use crate::imaging::{BackendError, ImageBackend, Quality, plan_rasters, write_rasters};
use crate::metadata::{self, Extraction, HeadlineResolver};
use crate::record::{ImageRecord, RecordError, SkipReason};
use crate::render::{self, IMAGES_DIR, PageData, SiteContext};
use crate::scan;
use crate::sync::{self, WritePolicy, WriteStats};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::SystemTime;
use thiserror::Error;

pub const INDEX_FILENAME: &str = "index.html";
pub const PAGES_JSON_FILENAME: &str = "images.json";

/// Pages written by the site itself. Compared case-insensitively, since
/// `Index.html` and `index.html` are one file on some filesystems.
const RESERVED_PAGES: &[&str] = &[INDEX_FILENAME];

fn is_reserved_page(page_name: &str) -> bool {
    RESERVED_PAGES.iter().any(|r| r.eq_ignore_ascii_case(page_name))
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("source is not a directory: {0}")]
    SourceNotDirectory(PathBuf),
    #[error("cannot create output directory {path}: {source}")]
    OutputUncreatable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Lifecycle(#[from] RecordError),
}

/// Failure while writing one image's outputs.
#[derive(Error, Debug)]
enum RenderError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lifecycle(#[from] RecordError),
}

/// Everything a build needs, fixed before the build starts.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub widths: Vec<u32>,
    pub quality: Quality,
    pub force_resync: bool,
    pub site_title: String,
    pub threads: usize,
}

impl BuildConfig {
    /// Combine the site config with the roots given on the command line.
    pub fn new(
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        site: &SiteConfig,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            widths: site.images.widths.clone(),
            quality: Quality::new(site.images.quality),
            force_resync: false,
            site_title: site.site.title.clone(),
            threads: crate::config::effective_threads(&site.processing),
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.output_root.join(IMAGES_DIR)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedImage {
    pub source_path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedImage {
    pub source_path: PathBuf,
    pub error: String,
}

/// Progress events streamed to the CLI while a build runs.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    ScanFinished {
        planned: usize,
        skipped: usize,
    },
    ImageSkipped {
        source_path: PathBuf,
        reason: SkipReason,
    },
    ImageRendered {
        page: String,
        title: String,
        thumbnails: Vec<u32>,
        writes: WriteStats,
    },
    ImageFailed {
        source_path: PathBuf,
        error: String,
    },
}

/// The images of one build pass and what happened to them.
#[derive(Debug)]
pub struct SiteBuildState<'a> {
    config: &'a BuildConfig,
    images: Vec<ImageRecord>,
    skipped: Vec<SkippedImage>,
    failed: Vec<FailedImage>,
}

impl<'a> SiteBuildState<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self {
            config,
            images: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        self.config
    }

    /// Records that made it through the scan phase.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn skipped(&self) -> &[SkippedImage] {
        &self.skipped
    }

    pub fn failed(&self) -> &[FailedImage] {
        &self.failed
    }

    fn skip(
        &mut self,
        mut record: ImageRecord,
        reason: SkipReason,
        events: Option<&Sender<BuildEvent>>,
    ) -> Result<(), SiteError> {
        record.skip(reason)?;
        tracing::info!(path = %record.source_path().display(), %reason, "skipping image");
        if let Some(tx) = events {
            tx.send(BuildEvent::ImageSkipped {
                source_path: record.source_path().to_path_buf(),
                reason,
            })
            .ok();
        }
        self.skipped.push(SkippedImage {
            source_path: record.source_path().to_path_buf(),
            reason,
        });
        Ok(())
    }

    fn fail(&mut self, source_path: &Path, error: String, events: Option<&Sender<BuildEvent>>) {
        tracing::warn!(path = %source_path.display(), %error, "image failed");
        if let Some(tx) = events {
            tx.send(BuildEvent::ImageFailed {
                source_path: source_path.to_path_buf(),
                error: error.clone(),
            })
            .ok();
        }
        self.failed.push(FailedImage {
            source_path: source_path.to_path_buf(),
            error,
        });
    }
}

/// Outcome of a completed build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Rendered pages, oldest capture first.
    pub pages: Vec<PageData>,
    pub skipped: Vec<SkippedImage>,
    pub failed: Vec<FailedImage>,
    pub writes: WriteStats,
}

impl BuildReport {
    /// Images that were not skipped, whether they rendered or failed.
    pub fn admitted(&self) -> usize {
        self.pages.len() + self.failed.len()
    }

    pub fn skipped_by_reason(&self) -> BTreeMap<SkipReason, usize> {
        let mut counts = BTreeMap::new();
        for s in &self.skipped {
            *counts.entry(s.reason).or_insert(0) += 1;
        }
        counts
    }
}

/// Scan the source root: admit, extract, and plan every candidate image.
///
/// Does not touch the output root.
pub fn scan_source<'a>(
    config: &'a BuildConfig,
    backend: &impl ImageBackend,
    resolver: Option<&dyn HeadlineResolver>,
    events: Option<&Sender<BuildEvent>>,
) -> Result<SiteBuildState<'a>, SiteError> {
    if !config.source_root.is_dir() {
        return Err(SiteError::SourceNotDirectory(config.source_root.clone()));
    }

    let images_dir = config.images_dir();
    let mut state = SiteBuildState::new(config);
    let mut claimed: HashSet<String> = HashSet::new();

    for path in scan::discover(&config.source_root)? {
        let mut record = ImageRecord::discover(&path);

        let probe = match backend.probe(&path) {
            Ok(probe) => probe,
            Err(BackendError::UnsupportedFormat(_)) => {
                state.skip(record, SkipReason::UnsupportedFormat, events)?;
                continue;
            }
            Err(e) => {
                state.fail(&path, e.to_string(), events);
                continue;
            }
        };
        record.admit(probe)?;

        let tags = match backend.read_tags(&path) {
            Ok(tags) => tags,
            Err(e) => {
                state.fail(&path, e.to_string(), events);
                continue;
            }
        };
        tracing::debug!(path = %path.display(), tags = tags.len(), "read tags");

        let sidecar = metadata::read_sidecar(&path);
        match metadata::extract(&tags, sidecar.as_deref(), resolver) {
            Ok(Extraction::Eligible(meta)) => record.resolve_metadata(meta)?,
            Ok(Extraction::Ineligible) => {
                state.skip(record, SkipReason::Ineligible, events)?;
                continue;
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "extraction failed");
                state.skip(record, SkipReason::from(&e), events)?;
                continue;
            }
        }

        if is_reserved_page(&record.page_name()) {
            state.skip(record, SkipReason::ReservedName, events)?;
            continue;
        }
        if !claimed.insert(record.base_name().to_string()) {
            state.skip(record, SkipReason::DuplicateBaseName, events)?;
            continue;
        }

        record.plan_thumbnails(&config.widths, &images_dir)?;
        state.images.push(record);
    }

    if let Some(tx) = events {
        tx.send(BuildEvent::ScanFinished {
            planned: state.images.len(),
            skipped: state.skipped.len(),
        })
        .ok();
    }
    Ok(state)
}

/// Build the site: scan, render every planned image, then write the index,
/// the page JSON, and the last-run marker.
pub fn build(
    config: &BuildConfig,
    backend: &impl ImageBackend,
    resolver: Option<&dyn HeadlineResolver>,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, SiteError> {
    if !config.source_root.is_dir() {
        return Err(SiteError::SourceNotDirectory(config.source_root.clone()));
    }
    let images_dir = config.images_dir();
    std::fs::create_dir_all(&images_dir).map_err(|source| SiteError::OutputUncreatable {
        path: images_dir.clone(),
        source,
    })?;

    let started = SystemTime::now();
    let policy = WritePolicy::new(config.force_resync, sync::last_run(&config.output_root));
    let mut state = scan_source(config, backend, resolver, events.as_ref())?;

    let site = SiteContext {
        title: config.site_title.clone(),
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let results: Vec<Result<(PageData, WriteStats), RenderError>> = pool.install(|| {
        state
            .images
            .par_iter_mut()
            .map(|record| render_image(record, config, backend, &policy, &site))
            .collect()
    });

    let mut report = BuildReport::default();
    let images = std::mem::take(&mut state.images);
    for (record, result) in images.iter().zip(results) {
        match result {
            Ok((page, writes)) => {
                if let Some(tx) = &events {
                    tx.send(BuildEvent::ImageRendered {
                        page: page.page.clone(),
                        title: page.title().to_string(),
                        thumbnails: page.thumbnails.iter().map(|t| t.width).collect(),
                        writes,
                    })
                    .ok();
                }
                report.writes.merge(writes);
                report.pages.push(page);
            }
            Err(e) => state.fail(record.source_path(), e.to_string(), events.as_ref()),
        }
    }

    report
        .pages
        .sort_by(|a, b| a.captured.cmp(&b.captured).then_with(|| a.base_name.cmp(&b.base_name)));

    let index = render::render_index(&report.pages, &site).into_string();
    report
        .writes
        .record(policy.write_text(&config.output_root.join(INDEX_FILENAME), &index)?);
    let json = serde_json::to_string_pretty(&report.pages)?;
    report
        .writes
        .record(policy.write_text(&config.output_root.join(PAGES_JSON_FILENAME), &json)?);

    sync::touch_marker(&config.output_root, started)?;

    report.skipped = state.skipped;
    report.failed = state.failed;
    tracing::info!(
        rendered = report.pages.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        writes = %report.writes,
        "build finished"
    );
    Ok(report)
}

/// Write one image's rasters and page, then mark it rendered.
fn render_image(
    record: &mut ImageRecord,
    config: &BuildConfig,
    backend: &impl ImageBackend,
    policy: &WritePolicy,
    site: &SiteContext,
) -> Result<(PageData, WriteStats), RenderError> {
    let mut writes = WriteStats::default();

    let rasters = plan_rasters(record, &config.images_dir(), config.quality);
    let written = write_rasters(backend, &rasters, |p| {
        policy.should_write_raster(&p.source, &p.output)
    })?;
    writes.merge(WriteStats {
        written: written as u32,
        unchanged: (rasters.len() - written) as u32,
    });

    let page = PageData::from_record(record).ok_or(RecordError::InvalidTransition {
        from: record.stage(),
        action: "render",
    })?;
    let html = render::render_image_page(&page, site).into_string();
    writes.record(policy.write_text(&config.output_root.join(&page.page), &html)?);

    record.mark_rendered()?;
    Ok((page, writes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::record::Stage;
    use crate::tags::fixtures::{ascii, geotagged};
    use crate::tags::{Tag, TagMap};
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        config: BuildConfig,
    }

    /// Source and output roots with the given (empty) source files.
    fn fixture(files: &[&str]) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photos");
        fs::create_dir(&source).unwrap();
        for name in files {
            fs::write(source.join(name), "pixels").unwrap();
        }
        let mut config = BuildConfig::new(&source, tmp.path().join("site"), &SiteConfig::default());
        config.widths = vec![1024, 320];
        config.threads = 2;
        Fixture { _tmp: tmp, config }
    }

    fn taken_at(date: &str) -> TagMap {
        geotagged().with(Tag::DateTimeOriginal, ascii(date))
    }

    // =========================================================================
    // Full builds
    // =========================================================================

    #[test]
    fn build_writes_rasters_pages_index_and_json() {
        let f = fixture(&["beach.jpg"]);
        let backend = MockBackend::new().with_image("beach.jpg", 1600, 1200, geotagged());

        let report = build(&f.config, &backend, None, None).unwrap();

        assert_eq!(report.pages.len(), 1);
        let page = &report.pages[0];
        assert_eq!(page.longitude, -122.0);
        assert_eq!(page.latitude, 37.5);
        assert_eq!(page.caption, "no description yet");
        let widths: Vec<u32> = page.thumbnails.iter().map(|t| t.width).collect();
        assert_eq!(widths, vec![1024, 320]);

        let out = &f.config.output_root;
        for file in [
            "images/beach_1024.jpg",
            "images/beach_320.jpg",
            "images/beach.jpg",
            "beach.html",
            INDEX_FILENAME,
            PAGES_JSON_FILENAME,
            sync::MARKER_FILENAME,
        ] {
            assert!(out.join(file).exists(), "missing {file}");
        }
        // 3 rasters + page + index + json
        assert_eq!(report.writes.written, 6);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(PAGES_JSON_FILENAME)).unwrap())
                .unwrap();
        assert_eq!(json[0]["base_name"], "beach");
    }

    #[test]
    fn thumbnails_never_exceed_native_width() {
        let f = fixture(&["small.jpg"]);
        let backend = MockBackend::new().with_image("small.jpg", 600, 400, geotagged());

        let report = build(&f.config, &backend, None, None).unwrap();

        let widths: Vec<u32> = report.pages[0].thumbnails.iter().map(|t| t.width).collect();
        assert_eq!(widths, vec![320]);
        let outputs = backend.resize_outputs();
        assert!(!outputs.iter().any(|p| p.ends_with("small_1024.jpg")));
        assert!(outputs.iter().any(|p| p.ends_with("small.jpg")));
    }

    #[test]
    fn ineligible_and_undated_images_are_skipped() {
        let f = fixture(&["a.jpg", "b.jpg", "c.jpg", "notes.md"]);
        let no_date = TagMap::new()
            .with(Tag::GpsLatitude, crate::tags::fixtures::dms(10, 0, 0))
            .with(Tag::GpsLongitude, crate::tags::fixtures::dms(20, 0, 0));
        let backend = MockBackend::new()
            .with_image("a.jpg", 800, 600, geotagged())
            .with_image("b.jpg", 800, 600, TagMap::new())
            .with_image("c.jpg", 800, 600, no_date);

        let report = build(&f.config, &backend, None, None).unwrap();

        assert_eq!(report.admitted(), 1);
        let by_reason = report.skipped_by_reason();
        assert_eq!(by_reason.get(&SkipReason::Ineligible), Some(&1));
        assert_eq!(by_reason.get(&SkipReason::NoDateFound), Some(&1));
        assert_eq!(by_reason.get(&SkipReason::UnsupportedFormat), Some(&1));

        let index = fs::read_to_string(f.config.output_root.join(INDEX_FILENAME)).unwrap();
        assert!(index.contains("a.html"));
        assert!(!index.contains("b.html"));
        assert!(!f.config.output_root.join("b.html").exists());
    }

    #[test]
    fn malformed_date_is_skipped() {
        let f = fixture(&["a.jpg"]);
        let backend = MockBackend::new().with_image("a.jpg", 800, 600, taken_at("yesterday"));

        let report = build(&f.config, &backend, None, None).unwrap();

        assert!(report.pages.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::MalformedDate);
    }

    #[test]
    fn duplicate_base_name_keeps_first() {
        let f = fixture(&["shot.jpg", "shot.png"]);
        let backend = MockBackend::new()
            .with_image("shot.jpg", 800, 600, geotagged())
            .with_image("shot.png", 800, 600, geotagged());

        let report = build(&f.config, &backend, None, None).unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::DuplicateBaseName);
        assert!(report.skipped[0].source_path.ends_with("shot.png"));
    }

    #[test]
    fn image_named_index_does_not_replace_site_index() {
        let f = fixture(&["Index.jpg", "beach.jpg"]);
        let backend = MockBackend::new()
            .with_image("Index.jpg", 1600, 1200, geotagged())
            .with_image("beach.jpg", 1600, 1200, geotagged());

        let first = build(&f.config, &backend, None, None).unwrap();
        assert_eq!(first.pages.len(), 1);
        assert_eq!(first.skipped.len(), 1);
        assert_eq!(first.skipped[0].reason, SkipReason::ReservedName);
        assert!(!f.config.images_dir().join("Index.jpg").exists());

        let index = fs::read_to_string(f.config.output_root.join(INDEX_FILENAME)).unwrap();
        assert!(index.contains(r#"href="beach.html""#));

        let second = build(&f.config, &backend, None, None).unwrap();
        assert_eq!(second.writes.written, 0);
    }

    #[test]
    fn awkward_file_names_get_working_links() {
        let f = fixture(&["pier #2.jpg"]);
        let backend = MockBackend::new().with_image("pier #2.jpg", 1600, 1200, geotagged());

        let report = build(&f.config, &backend, None, None).unwrap();

        assert_eq!(report.pages[0].page, "pier #2.html");
        assert!(f.config.output_root.join("pier #2.html").exists());
        let index = fs::read_to_string(f.config.output_root.join(INDEX_FILENAME)).unwrap();
        assert!(index.contains(r#"<a href="pier%20%232.html">"#));
        assert!(index.contains(r#"src="images/pier%20%232_320.jpg""#));
    }

    #[test]
    fn failed_image_does_not_abort_build() {
        let f = fixture(&["a.jpg", "b.jpg"]);
        let backend = MockBackend::new()
            .with_image("a.jpg", 800, 600, geotagged())
            .with_image("b.jpg", 800, 600, geotagged())
            .failing_resize("a_320");

        let report = build(&f.config, &backend, None, None).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].source_path.ends_with("a.jpg"));
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].base_name, "b");
        assert_eq!(report.admitted(), 2);
    }

    #[test]
    fn index_is_sorted_by_capture_time() {
        let f = fixture(&["a.jpg", "b.jpg", "c.jpg"]);
        let backend = MockBackend::new()
            .with_image("a.jpg", 800, 600, taken_at("2021:01:01 00:00:00"))
            .with_image("b.jpg", 800, 600, taken_at("2019:01:01 00:00:00"))
            .with_image("c.jpg", 800, 600, taken_at("2020:01:01 00:00:00"));

        let report = build(&f.config, &backend, None, None).unwrap();

        let order: Vec<&str> = report.pages.iter().map(|p| p.base_name.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn sidecar_caption_is_used() {
        let f = fixture(&["beach.jpg"]);
        fs::write(f.config.source_root.join("beach.txt"), "Fog rolling in\n").unwrap();
        let backend = MockBackend::new().with_image("beach.jpg", 800, 600, geotagged());

        let report = build(&f.config, &backend, None, None).unwrap();
        assert_eq!(report.pages[0].caption, "Fog rolling in");
    }

    #[test]
    fn resolver_supplies_headline() {
        struct Fixed;
        impl HeadlineResolver for Fixed {
            fn resolve(&self, _lat: f64, _lon: f64) -> Option<String> {
                Some("Half Moon Bay".to_string())
            }
        }

        let f = fixture(&["beach.jpg"]);
        let backend = MockBackend::new().with_image("beach.jpg", 800, 600, geotagged());

        let report = build(&f.config, &backend, Some(&Fixed), None).unwrap();
        assert_eq!(report.pages[0].headline.as_deref(), Some("Half Moon Bay"));
    }

    // =========================================================================
    // Incremental builds
    // =========================================================================

    #[test]
    fn second_build_writes_nothing() {
        let f = fixture(&["a.jpg", "b.jpg"]);
        let backend = MockBackend::new()
            .with_image("a.jpg", 1600, 1200, geotagged())
            .with_image("b.jpg", 800, 600, geotagged());

        let first = build(&f.config, &backend, None, None).unwrap();
        assert!(first.writes.written > 0);

        let resizes_before = backend.resize_outputs().len();
        let second = build(&f.config, &backend, None, None).unwrap();

        assert_eq!(second.writes.written, 0);
        assert_eq!(second.writes.unchanged, first.writes.total());
        assert_eq!(backend.resize_outputs().len(), resizes_before);
    }

    #[test]
    fn force_resync_rewrites_everything() {
        let f = fixture(&["a.jpg"]);
        let backend = MockBackend::new().with_image("a.jpg", 1600, 1200, geotagged());
        let first = build(&f.config, &backend, None, None).unwrap();

        let mut forced = f.config.clone();
        forced.force_resync = true;
        let second = build(&forced, &backend, None, None).unwrap();

        assert_eq!(second.writes.written, first.writes.written);
        assert_eq!(second.writes.unchanged, 0);
    }

    #[test]
    fn deleted_raster_is_regenerated() {
        let f = fixture(&["a.jpg"]);
        let backend = MockBackend::new().with_image("a.jpg", 1600, 1200, geotagged());
        build(&f.config, &backend, None, None).unwrap();

        fs::remove_file(f.config.images_dir().join("a_320.jpg")).unwrap();
        let second = build(&f.config, &backend, None, None).unwrap();

        assert_eq!(second.writes.written, 1);
        assert!(f.config.images_dir().join("a_320.jpg").exists());
    }

    /// Backend that edits one source while rasters are being encoded.
    struct EditedMidBuild {
        inner: MockBackend,
        source: PathBuf,
    }

    impl ImageBackend for EditedMidBuild {
        fn probe(&self, path: &Path) -> Result<crate::imaging::Probe, BackendError> {
            self.inner.probe(path)
        }

        fn read_tags(&self, path: &Path) -> Result<TagMap, BackendError> {
            self.inner.read_tags(path)
        }

        fn resize(&self, params: &crate::imaging::ResizeParams) -> Result<(), BackendError> {
            fs::File::options()
                .write(true)
                .open(&self.source)?
                .set_modified(SystemTime::now())?;
            self.inner.resize(params)
        }
    }

    #[test]
    fn source_edited_during_build_is_rewritten_next_time() {
        let f = fixture(&["a.jpg"]);
        let source = f.config.source_root.join("a.jpg");
        let edited = EditedMidBuild {
            inner: MockBackend::new().with_image("a.jpg", 1600, 1200, geotagged()),
            source: source.clone(),
        };
        build(&f.config, &edited, None, None).unwrap();

        let marker = sync::last_run(&f.config.output_root).unwrap();
        let modified = fs::metadata(&source).unwrap().modified().unwrap();
        assert!(modified > marker);

        let backend = MockBackend::new().with_image("a.jpg", 1600, 1200, geotagged());
        let second = build(&f.config, &backend, None, None).unwrap();
        assert_eq!(second.writes.written, 3);
    }

    // =========================================================================
    // Scan phase and errors
    // =========================================================================

    #[test]
    fn scan_does_not_touch_output_or_resize() {
        let f = fixture(&["a.jpg"]);
        let backend = MockBackend::new().with_image("a.jpg", 1600, 1200, geotagged());

        let state = scan_source(&f.config, &backend, None, None).unwrap();

        assert_eq!(state.images().len(), 1);
        assert_eq!(state.images()[0].stage(), Stage::ThumbnailsPlanned);
        assert!(!f.config.output_root.exists());
        assert!(
            backend
                .get_operations()
                .iter()
                .all(|op| !matches!(op, RecordedOp::Resize { .. }))
        );
    }

    #[test]
    fn missing_source_root_is_fatal() {
        let f = fixture(&[]);
        let mut config = f.config.clone();
        config.source_root = config.source_root.join("nope");
        let backend = MockBackend::new();

        assert!(matches!(
            build(&config, &backend, None, None),
            Err(SiteError::SourceNotDirectory(_))
        ));
    }

    #[test]
    fn empty_source_builds_empty_index() {
        let f = fixture(&[]);
        let report = build(&f.config, &MockBackend::new(), None, None).unwrap();

        assert!(report.pages.is_empty());
        let index = fs::read_to_string(f.config.output_root.join(INDEX_FILENAME)).unwrap();
        assert!(index.contains("No geotagged photos yet."));
    }

    #[test]
    fn events_are_streamed() {
        let f = fixture(&["a.jpg", "notes.md"]);
        let backend = MockBackend::new().with_image("a.jpg", 800, 600, geotagged());
        let (tx, rx) = mpsc::channel();

        build(&f.config, &backend, None, Some(tx)).unwrap();
        let events: Vec<BuildEvent> = rx.iter().collect();

        assert!(events.iter().any(|e| matches!(
            e,
            BuildEvent::ImageSkipped {
                reason: SkipReason::UnsupportedFormat,
                ..
            }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            BuildEvent::ScanFinished {
                planned: 1,
                skipped: 1
            }
        )));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, BuildEvent::ImageRendered { page, .. } if page == "a.html"))
        );
    }
}
