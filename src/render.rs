//! HTML rendering.
//!
//! Pages are built with [maud](https://maud.lambda.xyz/). Every page lives at
//! the output root and references rasters under `images/`:
//!
//! ```text
//! site/
//! ├── index.html              # All images, oldest capture first
//! ├── images.json             # PageData array for map clients
//! ├── IMG_0042.html           # One page per image
//! └── images/
//!     ├── IMG_0042.jpg        # Full-size copy
//!     ├── IMG_0042_1024.jpg   # Thumbnails, one per planned width
//!     └── IMG_0042_320.jpg
//! ```
//!
//! An image page shows the largest thumbnail, or the full-size copy when the
//! source was too small for any thumbnail. The index cards use the smallest.
//!
//! File names come straight from the source directory, so `pier #2.jpg`
//! becomes `pier #2.html` on disk. [`PageData`] keeps those raw relative
//! paths; links and image sources are percent-encoded when rendered.

use crate::record::ImageRecord;
use chrono::NaiveDateTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;

const CSS: &str = include_str!("../static/style.css");

/// Directory (relative to the output root) holding all rasters.
pub const IMAGES_DIR: &str = "images";

/// Everything a template needs to know about one image.
///
/// Paths are relative to the output root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageData {
    pub base_name: String,
    pub page: String,
    pub image: String,
    pub thumbnails: Vec<ThumbnailRef>,
    pub latitude: f64,
    pub longitude: f64,
    pub captured: NaiveDateTime,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailRef {
    pub width: u32,
    pub path: String,
}

impl PageData {
    /// Page data for a record whose metadata has been resolved.
    pub fn from_record(record: &ImageRecord) -> Option<Self> {
        let meta = record.metadata()?;
        Some(Self {
            base_name: record.base_name().to_string(),
            page: record.page_name(),
            image: format!("{IMAGES_DIR}/{}", record.full_size_name()),
            thumbnails: record
                .thumbnails()
                .iter()
                .map(|t| ThumbnailRef {
                    width: t.width,
                    path: format!("{IMAGES_DIR}/{}", t.file_name),
                })
                .collect(),
            latitude: meta.latitude.degrees(),
            longitude: meta.longitude.degrees(),
            captured: meta.capture_timestamp,
            caption: meta.caption.clone(),
            headline: meta.headline.clone(),
        })
    }

    /// Headline if known, else the base name.
    pub fn title(&self) -> &str {
        self.headline.as_deref().unwrap_or(&self.base_name)
    }

    /// Largest thumbnail, falling back to the full-size copy.
    pub fn display_image(&self) -> &str {
        self.thumbnails
            .iter()
            .max_by_key(|t| t.width)
            .map(|t| t.path.as_str())
            .unwrap_or(&self.image)
    }

    /// Smallest thumbnail, falling back to the full-size copy.
    pub fn card_image(&self) -> &str {
        self.thumbnails
            .iter()
            .min_by_key(|t| t.width)
            .map(|t| t.path.as_str())
            .unwrap_or(&self.image)
    }

    fn coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }

    fn map_url(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat:.6}&mlon={lon:.6}#map=15/{lat:.6}/{lon:.6}",
            lat = self.latitude,
            lon = self.longitude
        )
    }
}

/// Percent-encode a relative path for an `href` or `src`, keeping `/`.
pub fn url_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(char::from(byte))
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Site-wide values shared by every page.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub title: String,
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(site: &SiteContext, breadcrumb: Option<Markup>) -> Markup {
    html! {
        header.site-header {
            h1 { a href="index.html" { (site.title) } }
            @if let Some(crumb) = breadcrumb {
                nav.breadcrumb { (crumb) }
            }
        }
    }
}

fn timestamp(captured: &NaiveDateTime) -> Markup {
    html! {
        time datetime=(captured.format("%Y-%m-%dT%H:%M:%S").to_string()) {
            (captured.format("%Y-%m-%d %H:%M").to_string())
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a single image page.
pub fn render_image_page(page: &PageData, site: &SiteContext) -> Markup {
    let page_title = format!("{} - {}", page.title(), site.title);
    let breadcrumb = html! {
        a href="index.html" { "All photos" }
    };

    let content = html! {
        (site_header(site, Some(breadcrumb)))
        main.image-page {
            figure.image-frame {
                a href=(url_path(&page.image)) {
                    img src=(url_path(page.display_image())) alt=(page.title());
                }
                figcaption {
                    @if let Some(headline) = &page.headline {
                        h2 { (headline) }
                    }
                    p.caption { (page.caption) }
                }
            }
            dl.image-meta {
                dt { "Taken" }
                dd { (timestamp(&page.captured)) }
                dt { "Latitude" }
                dd.latitude { (format!("{:.6}", page.latitude)) }
                dt { "Longitude" }
                dd.longitude { (format!("{:.6}", page.longitude)) }
                dt { "Map" }
                dd { a href=(page.map_url()) rel="noopener" { "OpenStreetMap" } }
            }
        }
    };

    base_document(&page_title, content)
}

/// Renders the index page. `pages` are shown in the order given.
pub fn render_index(pages: &[PageData], site: &SiteContext) -> Markup {
    let content = html! {
        (site_header(site, None))
        main.index-page {
            @if pages.is_empty() {
                p.empty { "No geotagged photos yet." }
            } @else {
                ul.photo-grid {
                    @for page in pages {
                        li.photo-card {
                            a href=(url_path(&page.page)) {
                                img src=(url_path(page.card_image())) alt=(page.title()) loading="lazy";
                                span.photo-title { (page.title()) }
                                (timestamp(&page.captured))
                                span.coords { (page.coordinates()) }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(&site.title, content)
}
