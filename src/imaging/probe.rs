//! Header-only image probing.
//!
//! The decoder is constructed from the file header and asked for dimensions
//! and colour type; no pixel data is decoded.

use super::density::{DEFAULT_DPI, read_density};
use image::{ImageDecoder, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("{} is empty", .0.display())]
    Empty(PathBuf),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot read image header of {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{} reports zero width or height", .0.display())]
    ZeroSize(PathBuf),
}

/// What the orchestrator needs to know about one input file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub dpi: f64,
    pub has_alpha: bool,
    /// width ÷ height
    pub aspect_ratio: f64,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32, dpi: f64, has_alpha: bool) -> Self {
        Self {
            width,
            height,
            dpi,
            has_alpha,
            aspect_ratio: width as f64 / height.max(1) as f64,
        }
    }
}

/// Probe a file's header.
pub fn probe(path: &Path) -> Result<ImageInfo, ProbeError> {
    let io_err = |source: std::io::Error| ProbeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let decode_err = |source: image::ImageError| ProbeError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(path).map_err(io_err)?;
    if metadata.len() == 0 {
        return Err(ProbeError::Empty(path.to_path_buf()));
    }

    let reader = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?;
    let decoder = reader.into_decoder().map_err(decode_err)?;

    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(ProbeError::ZeroSize(path.to_path_buf()));
    }
    let has_alpha = decoder.color_type().has_alpha();
    let dpi = read_density(path).unwrap_or(DEFAULT_DPI);

    log::debug!(
        "probed {}: {width}x{height} {dpi}dpi alpha={has_alpha}",
        path.display()
    );
    Ok(ImageInfo::new(width, height, dpi, has_alpha))
}
