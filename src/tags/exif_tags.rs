//! EXIF tag store backed by `kamadak-exif`.

use super::{Tag, TagStore, TagValue};
use crate::geo::Rational;
use exif::{In, Reader, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Parsed EXIF block of one image.
pub struct ExifTags {
    exif: exif::Exif,
}

impl ExifTags {
    /// Parse the EXIF block from a JPEG, PNG, TIFF, or HEIF container.
    ///
    /// Returns `None` when the file cannot be opened or carries no EXIF.
    pub fn read(path: &Path) -> Option<Self> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => Some(Self { exif }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no EXIF block");
                None
            }
        }
    }

    fn exif_tag(tag: Tag) -> Option<exif::Tag> {
        Some(match tag {
            Tag::GpsLatitude => exif::Tag::GPSLatitude,
            Tag::GpsLatitudeRef => exif::Tag::GPSLatitudeRef,
            Tag::GpsLongitude => exif::Tag::GPSLongitude,
            Tag::GpsLongitudeRef => exif::Tag::GPSLongitudeRef,
            Tag::DateTimeOriginal => exif::Tag::DateTimeOriginal,
            Tag::DateTime => exif::Tag::DateTime,
            Tag::ImageDescription => exif::Tag::ImageDescription,
            Tag::IptcCaption | Tag::IptcHeadline | Tag::IptcObjectName => return None,
        })
    }
}

impl TagStore for ExifTags {
    fn get(&self, tag: Tag) -> Option<TagValue> {
        let field = self.exif.get_field(Self::exif_tag(tag)?, In::PRIMARY)?;
        convert_value(&field.value)
    }
}

/// Map an EXIF field value onto the crate's tag value shape.
fn convert_value(value: &Value) -> Option<TagValue> {
    match value {
        Value::Rational(rs) => Some(TagValue::Rationals(
            rs.iter()
                .map(|r| Rational::new(i64::from(r.num), i64::from(r.denom)))
                .collect(),
        )),
        Value::SRational(rs) => Some(TagValue::Rationals(
            rs.iter()
                .map(|r| Rational::new(i64::from(r.num), i64::from(r.denom)))
                .collect(),
        )),
        // ASCII fields may hold several NUL-separated strings; the first is the value.
        Value::Ascii(parts) => parts.first().map(|p| TagValue::Bytes(p.clone())),
        Value::Undefined(bytes, _) | Value::Byte(bytes) => Some(TagValue::Bytes(bytes.clone())),
        _ => None,
    }
}
