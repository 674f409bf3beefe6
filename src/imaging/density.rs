//! Pixel density (DPI) from image headers.
//!
//! The `image` crate reports dimensions and colour type but not resolution,
//! so the few header fields that carry it are read directly:
//!
//! - JPEG: the JFIF APP0 segment right after SOI, else the EXIF block via
//!   `kamadak-exif`.
//! - TIFF: IFD0 tags 282 (XResolution) and 296 (ResolutionUnit).
//! - PNG: the `pHYs` chunk, which is always per metre.
//!
//! Only header bytes are read. Chunk bodies and TIFF strips are skipped by
//! seeking, so a large file costs a handful of small reads.
//!
//! Any parse failure or missing field gives `None`; callers fall back to 72.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Density assumed when a file carries none.
pub const DEFAULT_DPI: f64 = 72.0;

const CM_PER_INCH: f64 = 2.54;
const METRES_PER_INCH: f64 = 0.0254;

/// Read the horizontal density of a file, dispatching on its magic bytes.
pub fn read_density(path: &Path) -> Option<f64> {
    let file = File::open(path).ok()?;
    density_from_reader(&mut BufReader::new(file))
}

pub fn density_from_reader<R: BufRead + Seek>(reader: &mut R) -> Option<f64> {
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic).ok()?;
    reader.seek(SeekFrom::Start(0)).ok()?;

    if magic.starts_with(&[0xFF, 0xD8]) {
        jpeg_density(reader)
    } else if magic == PNG_SIGNATURE {
        png_density(reader)
    } else if magic.starts_with(b"II") || magic.starts_with(b"MM") {
        tiff_density(reader)
    } else {
        None
    }
}

/// Convert a TIFF/EXIF resolution to dots per inch.
fn tiff_unit_to_dpi(resolution: f64, unit: u32) -> Option<f64> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return None;
    }
    match unit {
        2 => Some(resolution),
        3 => Some((resolution * CM_PER_INCH).round()),
        // 1 means no absolute unit
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JPEG
// ---------------------------------------------------------------------------

const JFIF_HEADER: &[u8] = b"JFIF\0";

fn jpeg_density<R: BufRead + Seek>(reader: &mut R) -> Option<f64> {
    if let Some(dpi) = jfif_density(reader) {
        return Some(dpi);
    }
    reader.seek(SeekFrom::Start(0)).ok()?;
    exif_density(reader)
}

/// SOI, APP0 marker and length, then "JFIF\0", version (2), units (1),
/// Xdensity (2), Ydensity (2).
fn jfif_density<R: Read>(reader: &mut R) -> Option<f64> {
    let mut head = [0u8; 18];
    reader.read_exact(&mut head).ok()?;
    if head[2..4] != [0xFF, 0xE0] || &head[6..11] != JFIF_HEADER {
        return None;
    }

    let units = head[13];
    let x = f64::from(u16::from_be_bytes([head[14], head[15]]));
    if x == 0.0 {
        return None;
    }
    match units {
        1 => Some(x),
        2 => Some((x * CM_PER_INCH).round()),
        // 0 is an aspect ratio only
        _ => None,
    }
}

fn exif_density<R: BufRead + Seek>(reader: &mut R) -> Option<f64> {
    let exif = Reader::new().read_from_container(reader).ok()?;

    let resolution = match &exif.get_field(Tag::XResolution, In::PRIMARY)?.value {
        Value::Rational(values) => values.first()?.to_f64(),
        _ => return None,
    };
    let unit = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(2);

    tiff_unit_to_dpi(resolution, unit)
}

// ---------------------------------------------------------------------------
// TIFF
// ---------------------------------------------------------------------------

// A plain TIFF is walked by seeking rather than through kamadak-exif, whose
// container reader loads the whole TIFF into memory.

const TAG_X_RESOLUTION: u16 = 282;
const TAG_RESOLUTION_UNIT: u16 = 296;
const TYPE_SHORT: u16 = 3;
const TYPE_RATIONAL: u16 = 5;
const IFD_ENTRY_LEN: usize = 12;

#[derive(Clone, Copy)]
struct ByteOrder {
    big_endian: bool,
}

impl ByteOrder {
    fn u16(self, b: &[u8]) -> u16 {
        let bytes = [b[0], b[1]];
        if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        }
    }

    fn u32(self, b: &[u8]) -> u32 {
        let bytes = [b[0], b[1], b[2], b[3]];
        if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        }
    }
}

fn tiff_density<R: Read + Seek>(reader: &mut R) -> Option<f64> {
    let mut header = [0u8; 8];
    reader.read_exact(&mut header).ok()?;
    let order = match &header[0..2] {
        b"MM" => ByteOrder { big_endian: true },
        b"II" => ByteOrder { big_endian: false },
        _ => return None,
    };
    if order.u16(&header[2..4]) != 42 {
        return None;
    }

    reader
        .seek(SeekFrom::Start(u64::from(order.u32(&header[4..8]))))
        .ok()?;
    let mut count = [0u8; 2];
    reader.read_exact(&mut count).ok()?;
    let mut entries = vec![0u8; usize::from(order.u16(&count)) * IFD_ENTRY_LEN];
    reader.read_exact(&mut entries).ok()?;

    let mut rational_offset = None;
    // Inches unless told otherwise
    let mut unit = 2;
    for entry in entries.chunks_exact(IFD_ENTRY_LEN) {
        match (order.u16(&entry[0..2]), order.u16(&entry[2..4])) {
            (TAG_X_RESOLUTION, TYPE_RATIONAL) => rational_offset = Some(order.u32(&entry[8..12])),
            (TAG_RESOLUTION_UNIT, TYPE_SHORT) => unit = order.u16(&entry[8..10]),
            _ => {}
        }
    }

    reader
        .seek(SeekFrom::Start(u64::from(rational_offset?)))
        .ok()?;
    let mut rational = [0u8; 8];
    reader.read_exact(&mut rational).ok()?;
    let num = f64::from(order.u32(&rational[0..4]));
    let den = f64::from(order.u32(&rational[4..8]));
    if den == 0.0 {
        return None;
    }

    tiff_unit_to_dpi(num / den, u32::from(unit))
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn png_density<R: Read + Seek>(reader: &mut R) -> Option<f64> {
    reader.seek(SeekFrom::Start(PNG_SIGNATURE.len() as u64)).ok()?;

    loop {
        let mut head = [0u8; 8];
        reader.read_exact(&mut head).ok()?;
        let len = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);

        match &head[4..8] {
            b"pHYs" => {
                let mut body = [0u8; 9];
                reader.read_exact(&mut body).ok()?;
                let x = f64::from(u32::from_be_bytes([body[0], body[1], body[2], body[3]]));
                // unit 1 = metre; 0 = aspect ratio only
                return (body[8] == 1 && x > 0.0).then(|| (x * METRES_PER_INCH).round());
            }
            // pHYs must precede image data
            b"IDAT" | b"IEND" => return None,
            // body plus CRC
            _ => {
                reader.seek(SeekFrom::Current(i64::from(len) + 4)).ok()?;
            }
        }
    }
}
