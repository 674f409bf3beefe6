//! Shared test utilities.
//!
//! Real image files for the probe (written with the `image` crate, format
//! chosen by extension) and a neutral [`RunConfig`] to tweak per test.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! create_test_png(&tmp.path().join("a.png"), 800, 600);
//!
//! let mut config = base_config();
//! config.dpi = Some(300);
//! ```

use crate::args::{RunConfig, SourceSpec};
use crate::imaging::Quality;
use crate::types::CropOrigin;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Image fixtures
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Opaque RGB PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height).save(path).unwrap();
}

/// RGBA PNG, half transparent.
pub fn create_test_rgba_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 128]))
        .save(path)
        .unwrap();
}

pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height).save(path).unwrap();
}

pub fn create_test_tiff(path: &Path, width: u32, height: u32) {
    gradient(width, height).save(path).unwrap();
}

// =========================================================================
// Configuration
// =========================================================================

/// A run with no actions, no destination and default quality.
pub fn base_config() -> RunConfig {
    RunConfig {
        source: SourceSpec::Path(".".to_string()),
        destination: None,
        actions: Vec::new(),
        target_format: None,
        dpi: None,
        jpeg_quality: Quality::new(80.0),
        crop_origin: CropOrigin::ToolDefault,
        overwrite: false,
        delete_source: false,
        create_dirs: false,
        info_only: false,
        quiet: false,
        verbose: false,
    }
}
