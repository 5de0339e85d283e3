//! IPTC-IIM application record reader.
//!
//! Datasets of interest in Record 2:
//!
//! | Dataset | Name | Tag |
//! |---|---|---|
//! | 2:05 | ObjectName | [`Tag::IptcObjectName`] |
//! | 2:105 | Headline | [`Tag::IptcHeadline`] |
//! | 2:120 | Caption-Abstract | [`Tag::IptcCaption`] |
//!
//! JPEG files carry IIM inside APP13 (Photoshop 8BIM resource 0x0404).
//! TIFF files carry it in IFD tag 33723 directly, or in 34377 as 8BIM blocks.
//! Values are kept as raw bytes; decoding happens in the extractor.

use super::{Tag, TagStore, TagValue};
use std::path::Path;

const RECORD_APPLICATION: u8 = 2;
const DATASET_OBJECT_NAME: u8 = 5;
const DATASET_HEADLINE: u8 = 105;
const DATASET_CAPTION: u8 = 120;

const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

const TIFF_TAG_IPTC_NAA: u16 = 33723;
const TIFF_TAG_PHOTOSHOP: u16 = 34377;

/// The three IPTC datasets the extractor consults, as raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IptcTags {
    object_name: Option<Vec<u8>>,
    headline: Option<Vec<u8>>,
    caption: Option<Vec<u8>>,
}

impl IptcTags {
    /// Read IPTC datasets from a file, sniffing JPEG or TIFF by magic bytes.
    ///
    /// Any read or parse failure yields an empty store.
    pub fn read(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(_) => Self::default(),
        }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0xFF, 0xD8]) {
            find_jpeg_app13_iptc(data)
                .map(parse_iim)
                .unwrap_or_default()
        } else if data.starts_with(b"II") || data.starts_with(b"MM") {
            read_from_tiff(data)
        } else {
            Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.object_name.is_none() && self.headline.is_none() && self.caption.is_none()
    }
}

impl TagStore for IptcTags {
    fn get(&self, tag: Tag) -> Option<TagValue> {
        let raw = match tag {
            Tag::IptcObjectName => &self.object_name,
            Tag::IptcHeadline => &self.headline,
            Tag::IptcCaption => &self.caption,
            _ => return None,
        };
        raw.clone().map(TagValue::Bytes)
    }
}

// ---------------------------------------------------------------------------
// IIM datasets
// ---------------------------------------------------------------------------

/// Walk IIM datasets: `0x1C, record, dataset, len(u16 BE), bytes`.
///
/// Later occurrences of a dataset replace earlier ones.
fn parse_iim(data: &[u8]) -> IptcTags {
    let mut tags = IptcTags::default();
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != 0x1C {
            pos += 1;
            continue;
        }

        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;

        let Some(value) = data.get(pos..pos + length) else {
            break;
        };
        pos += length;

        if record != RECORD_APPLICATION || value.is_empty() {
            continue;
        }
        let slot = match dataset {
            DATASET_OBJECT_NAME => &mut tags.object_name,
            DATASET_HEADLINE => &mut tags.headline,
            DATASET_CAPTION => &mut tags.caption,
            _ => continue,
        };
        *slot = Some(value.to_vec());
    }

    tags
}

// ---------------------------------------------------------------------------
// JPEG APP13
// ---------------------------------------------------------------------------

fn find_jpeg_app13_iptc(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        match marker {
            // Start of scan: entropy-coded data follows, no more headers.
            0xDA => break,
            0x00 | 0xFF => {
                pos += 1;
                continue;
            }
            0xD0..=0xD9 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if marker == 0xED
            && let Some(iptc) = data.get(pos + 4..seg_end).and_then(extract_from_8bim)
        {
            return Some(iptc);
        }
        pos += 2 + seg_len;
    }
    None
}

/// Locate resource 0x0404 in a Photoshop image-resource block.
///
/// Each resource: `8BIM`, id (u16), Pascal name padded to even, size (u32),
/// data padded to even.
fn extract_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;

        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        let name_len = *data.get(pos)? as usize;
        pos += 1 + name_len + ((1 + name_len) % 2);

        let size_bytes = data.get(pos..pos + 4)?;
        let size = u32::from_be_bytes([size_bytes[0], size_bytes[1], size_bytes[2], size_bytes[3]])
            as usize;
        pos += 4;

        let body = data.get(pos..pos + size)?;
        if resource_id == IPTC_RESOURCE_ID {
            return Some(body);
        }
        pos += size + (size % 2);
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF IFDs
// ---------------------------------------------------------------------------

struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl TiffReader<'_> {
    fn u16_at(&self, offset: usize) -> Option<u16> {
        let b = self.data.get(offset..offset + 2)?;
        Some(if self.big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let b = self.data.get(offset..offset + 4)?;
        Some(if self.big_endian {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
    }
}

/// Size in bytes of one value of a TIFF field type.
fn tiff_type_size(typ: u16) -> usize {
    match typ {
        3 | 8 => 2,
        4 | 9 | 11 => 4,
        5 | 10 | 12 => 8,
        _ => 1,
    }
}

fn read_from_tiff(data: &[u8]) -> IptcTags {
    let reader = TiffReader {
        data,
        big_endian: data.starts_with(b"MM"),
    };
    walk_tiff_ifds(&reader).unwrap_or_default()
}

fn walk_tiff_ifds(tiff: &TiffReader<'_>) -> Option<IptcTags> {
    if tiff.u16_at(2)? != 42 {
        return None;
    }

    let mut ifd_offset = tiff.u32_at(4)? as usize;
    // Bound the chain so a looping next-IFD pointer cannot spin forever.
    for _ in 0..64 {
        if ifd_offset == 0 {
            break;
        }
        let entry_count = tiff.u16_at(ifd_offset)? as usize;
        let entries_start = ifd_offset + 2;

        for i in 0..entry_count {
            let entry = entries_start + i * 12;
            let tag = tiff.u16_at(entry)?;
            if tag != TIFF_TAG_IPTC_NAA && tag != TIFF_TAG_PHOTOSHOP {
                continue;
            }
            let typ = tiff.u16_at(entry + 2)?;
            let count = tiff.u32_at(entry + 4)? as usize;
            let byte_len = count.saturating_mul(tiff_type_size(typ));
            let value_offset = tiff.u32_at(entry + 8)? as usize;
            let Some(payload) = tiff.data.get(value_offset..value_offset + byte_len) else {
                continue;
            };

            let iim = if tag == TIFF_TAG_IPTC_NAA {
                Some(payload)
            } else {
                extract_from_8bim(payload)
            };
            if let Some(found) = iim.map(parse_iim)
                && !found.is_empty()
            {
                return Some(found);
            }
        }

        ifd_offset = tiff.u32_at(entries_start + entry_count * 12)? as usize;
    }
    None
}
