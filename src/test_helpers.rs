//! Shared test utilities: synthetic image files with real embedded EXIF.
//!
//! Only depends on `image` and std so integration tests can pull it in with
//! `#[path = "../src/test_helpers.rs"] mod test_helpers;`.
//!
//! # Usage
//!
//! ```ignore
//! let exif = ExifFixture {
//!     latitude: Some(([(37, 1), (30, 1), (0, 1)], "N")),
//!     longitude: Some(([(-122, 1), (0, 1), (0, 1)], "W")),
//!     date_time: Some("2019:08:04 12:28:53".into()),
//!     ..ExifFixture::default()
//! };
//! write_jpeg_with_exif(&dir.join("bridge.jpg"), 1600, 1200, &exif);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, ImageFormat, RgbImage};
use std::path::Path;

// =========================================================================
// Plain images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut bytes = Vec::new();
    JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// Create a small valid JPEG file with the given dimensions and no metadata.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_jpeg(width, height)).unwrap();
}

/// Create a PNG regardless of the path's extension.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

// =========================================================================
// EXIF fixtures
// =========================================================================

/// DMS triple as `(numerator, denominator)` pairs, plus the reference letter.
pub type GpsFixture = ([(i32, i32); 3], &'static str);

/// Tags to embed in a fixture JPEG. Absent fields are not written at all.
#[derive(Debug, Clone, Default)]
pub struct ExifFixture {
    pub latitude: Option<GpsFixture>,
    pub longitude: Option<GpsFixture>,
    /// Written to IFD0 `DateTime` (0x0132).
    pub date_time: Option<String>,
    /// Written to IFD0 `ImageDescription` (0x010E).
    pub description: Option<String>,
}

/// Write a JPEG whose APP1 segment carries the given EXIF tags.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, exif: &ExifFixture) {
    let jpeg = encode_jpeg(width, height);
    let tiff = build_tiff(exif);

    let mut app1 = vec![0xFF, 0xE1];
    app1.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&tiff);

    // Splice right after SOI.
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;
const TYPE_SRATIONAL: u16 = 10;

struct Entry {
    tag: u16,
    typ: u16,
    count: u32,
    data: Vec<u8>,
}

fn ascii_entry(tag: u16, text: &str) -> Entry {
    let mut data = text.as_bytes().to_vec();
    data.push(0);
    Entry {
        tag,
        typ: TYPE_ASCII,
        count: data.len() as u32,
        data,
    }
}

/// Unsigned RATIONAL unless a component is negative, then SRATIONAL.
fn rational_entry(tag: u16, dms: &[(i32, i32); 3]) -> Entry {
    let signed = dms.iter().any(|&(n, d)| n < 0 || d < 0);
    let mut data = Vec::with_capacity(24);
    for &(n, d) in dms {
        data.extend_from_slice(&n.to_le_bytes());
        data.extend_from_slice(&d.to_le_bytes());
    }
    Entry {
        tag,
        typ: if signed { TYPE_SRATIONAL } else { TYPE_RATIONAL },
        count: 3,
        data,
    }
}

fn ifd_len(entries: &[Entry]) -> usize {
    let out_of_line: usize = entries
        .iter()
        .filter(|e| e.data.len() > 4)
        .map(|e| e.data.len() + e.data.len() % 2)
        .sum();
    2 + entries.len() * 12 + 4 + out_of_line
}

/// Serialize one little-endian IFD located at `base`, values following it.
fn encode_ifd(entries: &[Entry], base: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut extra = Vec::new();
    let mut data_offset = base + 2 + entries.len() * 12 + 4;

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for e in entries {
        out.extend_from_slice(&e.tag.to_le_bytes());
        out.extend_from_slice(&e.typ.to_le_bytes());
        out.extend_from_slice(&e.count.to_le_bytes());
        if e.data.len() <= 4 {
            let mut inline = e.data.clone();
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&(data_offset as u32).to_le_bytes());
            extra.extend_from_slice(&e.data);
            if e.data.len() % 2 == 1 {
                extra.push(0);
            }
            data_offset += e.data.len() + e.data.len() % 2;
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&extra);
    out
}

fn build_tiff(exif: &ExifFixture) -> Vec<u8> {
    let mut gps = Vec::new();
    if let Some((dms, reference)) = &exif.latitude {
        gps.push(ascii_entry(0x0001, reference));
        gps.push(rational_entry(0x0002, dms));
    }
    if let Some((dms, reference)) = &exif.longitude {
        gps.push(ascii_entry(0x0003, reference));
        gps.push(rational_entry(0x0004, dms));
    }

    let mut ifd0 = Vec::new();
    if let Some(description) = &exif.description {
        ifd0.push(ascii_entry(0x010E, description));
    }
    if let Some(date_time) = &exif.date_time {
        ifd0.push(ascii_entry(0x0132, date_time));
    }
    if !gps.is_empty() {
        // Placeholder; patched once IFD0's size is known.
        ifd0.push(Entry {
            tag: 0x8825,
            typ: TYPE_LONG,
            count: 1,
            data: vec![0; 4],
        });
    }

    let ifd0_offset = 8;
    let gps_offset = ifd0_offset + ifd_len(&ifd0);
    if let Some(pointer) = ifd0.iter_mut().find(|e| e.tag == 0x8825) {
        pointer.data = (gps_offset as u32).to_le_bytes().to_vec();
    }

    let mut tiff = b"II".to_vec();
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&(ifd0_offset as u32).to_le_bytes());
    tiff.extend_from_slice(&encode_ifd(&ifd0, ifd0_offset));
    if !gps.is_empty() {
        tiff.extend_from_slice(&encode_ifd(&gps, gps_offset));
    }
    tiff
}
