//! Image metadata extraction.
//!
//! Turns an image's embedded tags into an [`ImageMetadata`] value, or decides
//! the image does not belong in the gallery.
//!
//! ## Eligibility
//!
//! A gallery page is built around a map position, so an image is only
//! eligible when it carries **both** `GPSLatitude` and `GPSLongitude`. Images
//! with neither (or only one) come back as [`Extraction::Ineligible`], which
//! is not an error. Images that claim a position but encode it badly are an
//! error ([`ExtractError::MalformedCoordinate`]).
//!
//! ## Field resolution
//!
//! Each field is resolved independently; the first non-empty source wins.
//!
//! | Field | Sources, in priority order | Fallback |
//! |---|---|---|
//! | capture time | EXIF `DateTimeOriginal`, `DateTime` | [`ExtractError::NoDateFound`] |
//! | caption | sidecar `.txt`, IPTC Caption-Abstract (2:120), EXIF `ImageDescription` | [`FALLBACK_CAPTION`] |
//! | headline | IPTC Headline (2:105), IPTC ObjectName (2:05), [`HeadlineResolver`] | `None` |
//!
//! Sidecar files are explicit overrides: the user created the file on purpose,
//! so they trump anything embedded by a camera or editing tool.

use crate::geo::{self, Axis, CoordinateError, GeoCoordinate, Hemisphere};
use crate::tags::{Tag, TagStore};
use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;

/// Caption shown for images that carry no description anywhere.
pub const FALLBACK_CAPTION: &str = "no description yet";

/// EXIF date layout: `YYYY:MM:DD HH:MM:SS`.
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("malformed GPS coordinate: {0}")]
    MalformedCoordinate(#[from] CoordinateError),
    #[error("no capture date (DateTimeOriginal or DateTime)")]
    NoDateFound,
    #[error("unparsable capture date {0:?}")]
    MalformedDate(String),
}

/// Everything the site needs to know about one eligible image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    pub latitude: GeoCoordinate,
    pub longitude: GeoCoordinate,
    pub capture_timestamp: NaiveDateTime,
    pub caption: String,
    pub headline: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Eligible(ImageMetadata),
    /// No GPS position; the image is left out of the site.
    Ineligible,
}

/// Supplies a headline from a position when the image has none embedded.
///
/// Typically a reverse geocoder. Returning `None` (including on lookup
/// failure) leaves the headline unset.
pub trait HeadlineResolver: Send + Sync {
    fn resolve(&self, latitude: f64, longitude: f64) -> Option<String>;
}

/// Extract metadata from an image's tags.
///
/// `sidecar` is caption text supplied from outside the image (see
/// [`read_sidecar`]); it takes priority over embedded captions.
pub fn extract(
    tags: &dyn TagStore,
    sidecar: Option<&str>,
    resolver: Option<&dyn HeadlineResolver>,
) -> Result<Extraction, ExtractError> {
    let (Some(lat_dms), Some(lon_dms)) = (tags.get(Tag::GpsLatitude), tags.get(Tag::GpsLongitude))
    else {
        return Ok(Extraction::Ineligible);
    };

    let latitude = read_axis(
        tags,
        Axis::Latitude,
        lat_dms.as_rationals(),
        Tag::GpsLatitudeRef,
    )?;
    let longitude = read_axis(
        tags,
        Axis::Longitude,
        lon_dms.as_rationals(),
        Tag::GpsLongitudeRef,
    )?;

    let capture_timestamp = read_capture_time(tags)?;

    let iptc_caption = text(tags, Tag::IptcCaption);
    let exif_description = text(tags, Tag::ImageDescription);
    let caption = resolve(&[
        sidecar,
        iptc_caption.as_deref(),
        exif_description.as_deref(),
    ])
    .unwrap_or_else(|| FALLBACK_CAPTION.to_string());

    let iptc_headline = text(tags, Tag::IptcHeadline);
    let object_name = text(tags, Tag::IptcObjectName);
    let headline = resolve(&[iptc_headline.as_deref(), object_name.as_deref()]).or_else(|| {
        resolver
            .and_then(|r| r.resolve(latitude.degrees(), longitude.degrees()))
            .and_then(|h| resolve(&[Some(h.as_str())]))
    });

    Ok(Extraction::Eligible(ImageMetadata {
        latitude,
        longitude,
        capture_timestamp,
        caption,
        headline,
    }))
}

fn text(tags: &dyn TagStore, tag: Tag) -> Option<String> {
    tags.get(tag).and_then(|v| v.as_text())
}

fn read_axis(
    tags: &dyn TagStore,
    axis: Axis,
    dms: Option<&[geo::Rational]>,
    ref_tag: Tag,
) -> Result<GeoCoordinate, ExtractError> {
    // A text-typed position is as broken as a short one.
    let dms = dms.unwrap_or(&[]);
    let hemisphere = match text(tags, ref_tag) {
        Some(reference) => reference.parse::<Hemisphere>()?,
        None => {
            let assumed = Hemisphere::positive(axis);
            tracing::debug!(%axis, %assumed, "{} missing, assuming positive hemisphere", ref_tag.name());
            assumed
        }
    };
    Ok(geo::convert_axis(axis, dms, hemisphere)?)
}

fn read_capture_time(tags: &dyn TagStore) -> Result<NaiveDateTime, ExtractError> {
    let raw = text(tags, Tag::DateTimeOriginal)
        .or_else(|| text(tags, Tag::DateTime))
        .ok_or(ExtractError::NoDateFound)?;
    NaiveDateTime::parse_from_str(&raw, EXIF_DATE_FORMAT)
        .map_err(|_| ExtractError::MalformedDate(raw))
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value, trimmed.
///
/// ```text
/// caption:  resolve(&[sidecar, iptc_caption, exif_description])
/// headline: resolve(&[iptc_headline, iptc_object_name])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Read a sidecar `.txt` file for an image.
///
/// Given `photos/IMG_0042.jpg`, looks for `photos/IMG_0042.txt` and returns
/// its trimmed contents. Returns `None` if the file doesn't exist or is empty.
pub fn read_sidecar(image_path: &Path) -> Option<String> {
    let sidecar = image_path.with_extension("txt");
    std::fs::read_to_string(sidecar)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
