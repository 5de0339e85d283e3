//! Embedded metadata access behind a single [`TagStore`] interface.
//!
//! Photos carry their metadata in two unrelated binary formats:
//!
//! | Namespace | Where it lives | Reader |
//! |---|---|---|
//! | EXIF | JPEG APP1 / PNG `eXIf` (TIFF IFDs) | [`ExifTags`] via `kamadak-exif` |
//! | IPTC-IIM | JPEG APP13 8BIM / TIFF IFD 33723 | [`IptcTags`] (in-crate parser) |
//!
//! Both are exposed as a mapping from [`Tag`] to [`TagValue`]. The metadata
//! extractor only ever talks to `&dyn TagStore`, so adding another format
//! means adding another implementation, nothing else.

mod exif_tags;
mod iptc;

pub use exif_tags::ExifTags;
pub use iptc::IptcTags;

use crate::geo::Rational;
use std::collections::BTreeMap;
use std::path::Path;

/// Tags the extractor understands, across both namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    GpsLatitude,
    GpsLatitudeRef,
    GpsLongitude,
    GpsLongitudeRef,
    DateTimeOriginal,
    DateTime,
    ImageDescription,
    IptcCaption,
    IptcHeadline,
    IptcObjectName,
}

impl Tag {
    pub const ALL: [Tag; 10] = [
        Tag::GpsLatitude,
        Tag::GpsLatitudeRef,
        Tag::GpsLongitude,
        Tag::GpsLongitudeRef,
        Tag::DateTimeOriginal,
        Tag::DateTime,
        Tag::ImageDescription,
        Tag::IptcCaption,
        Tag::IptcHeadline,
        Tag::IptcObjectName,
    ];

    /// Conventional `Namespace Name` label, as printed by exif tooling.
    pub fn name(self) -> &'static str {
        match self {
            Tag::GpsLatitude => "GPS GPSLatitude",
            Tag::GpsLatitudeRef => "GPS GPSLatitudeRef",
            Tag::GpsLongitude => "GPS GPSLongitude",
            Tag::GpsLongitudeRef => "GPS GPSLongitudeRef",
            Tag::DateTimeOriginal => "EXIF DateTimeOriginal",
            Tag::DateTime => "Image DateTime",
            Tag::ImageDescription => "Image ImageDescription",
            Tag::IptcCaption => "IPTC Caption-Abstract",
            Tag::IptcHeadline => "IPTC Headline",
            Tag::IptcObjectName => "IPTC ObjectName",
        }
    }
}

/// A raw tag value. Text stays as bytes until the extractor decodes it.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Rationals(Vec<Rational>),
    Text(String),
    Bytes(Vec<u8>),
}

impl TagValue {
    /// Decode text-like values as UTF-8, trimming NUL padding and whitespace.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Returns `None` for
    /// rational values and for values that are empty after trimming.
    pub fn as_text(&self) -> Option<String> {
        let decoded = match self {
            TagValue::Text(s) => s.clone(),
            TagValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            TagValue::Rationals(_) => return None,
        };
        let trimmed = decoded.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn as_rationals(&self) -> Option<&[Rational]> {
        match self {
            TagValue::Rationals(r) => Some(r),
            _ => None,
        }
    }
}

/// Read access to an image's embedded tags.
pub trait TagStore {
    fn get(&self, tag: Tag) -> Option<TagValue>;

    fn contains(&self, tag: Tag) -> bool {
        self.get(tag).is_some()
    }
}

/// Owned, in-memory tag mapping.
///
/// This is what backends hand back to the site builder: it is `Send`, cheap
/// to inspect, and trivially constructed in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMap {
    entries: BTreeMap<Tag, TagValue>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag, value: TagValue) -> &mut Self {
        self.entries.insert(tag, value);
        self
    }

    /// Builder-style insert for tests and fixtures.
    pub fn with(mut self, tag: Tag, value: TagValue) -> Self {
        self.entries.insert(tag, value);
        self
    }

    /// Materialize every known tag from another store.
    pub fn collect_from(store: &dyn TagStore) -> Self {
        let entries = Tag::ALL
            .iter()
            .filter_map(|&tag| store.get(tag).map(|v| (tag, v)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.entries.keys().copied()
    }
}

impl TagStore for TagMap {
    fn get(&self, tag: Tag) -> Option<TagValue> {
        self.entries.get(&tag).cloned()
    }
}

/// Several stores queried in order; the first one holding a tag wins.
#[derive(Default)]
pub struct LayeredTags {
    layers: Vec<Box<dyn TagStore>>,
}

impl LayeredTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, store: impl TagStore + 'static) -> Self {
        self.layers.push(Box::new(store));
        self
    }
}

impl TagStore for LayeredTags {
    fn get(&self, tag: Tag) -> Option<TagValue> {
        self.layers.iter().find_map(|layer| layer.get(tag))
    }
}

/// Read both metadata namespaces from a file into one owned map.
///
/// Either reader failing (no EXIF block, no APP13) simply contributes nothing.
pub fn read_tags(path: &Path) -> TagMap {
    let mut layered = LayeredTags::new();
    if let Some(exif) = ExifTags::read(path) {
        layered = layered.push(exif);
    }
    layered = layered.push(IptcTags::read(path));
    TagMap::collect_from(&layered)
}
