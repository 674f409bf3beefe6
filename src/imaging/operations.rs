//! Per-file planning.
//!
//! These functions turn the run configuration and one probed image into the
//! exact parameters for each tool invocation. They do no I/O, so the whole
//! plan for a file can be checked without running anything.

use super::geometry;
use super::params::{ConvertParams, GeometryParams, Quality, ResolutionParams};
use super::probe::ImageInfo;
use crate::types::{Action, ActionKind, CropOrigin, ImageFormat};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the output path to name the working file.
pub const STAGING_SUFFIX: &str = ".sipstmp";

/// Working-file path for an output path.
pub fn staging_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

/// Output path with its extension replaced.
pub fn reformatted_path(output: &Path, extension: &str) -> PathBuf {
    output.with_extension(extension)
}

/// How the working file gets created.
#[derive(Debug, Clone, PartialEq)]
pub enum Staging {
    /// The source is already in the staging format: a plain file copy.
    Copy { from: PathBuf, to: PathBuf },
    /// Have the tool write the staging format.
    Convert(ConvertParams),
}

/// Plan the working copy of `source`.
///
/// A TIFF source is copied unless it is being written back over itself;
/// everything else goes through the tool.
pub fn plan_staging(source: &Path, output: &Path, tmp: &Path) -> Staging {
    if ImageFormat::of_path(source) == Some(ImageFormat::STAGING) && source != output {
        Staging::Copy {
            from: source.to_path_buf(),
            to: tmp.to_path_buf(),
        }
    } else {
        Staging::Convert(ConvertParams {
            source: source.to_path_buf(),
            output: tmp.to_path_buf(),
            format: ImageFormat::STAGING,
            quality: None,
        })
    }
}

/// Plan one geometric action against the working file.
pub fn plan_action(action: &Action, info: &ImageInfo, origin: CropOrigin, tmp: &Path) -> GeometryParams {
    let resolved = geometry::resolve(action, info, origin);
    let pad_colour = match action.kind {
        ActionKind::Scale => None,
        ActionKind::Crop | ActionKind::Pad => Some(action.pad_colour.clone()),
    };
    GeometryParams {
        file: tmp.to_path_buf(),
        kind: action.kind,
        width: resolved.width,
        height: resolved.height,
        offset: resolved.offset,
        pad_colour,
    }
}

pub fn plan_resolution(tmp: &Path, dpi: u32) -> ResolutionParams {
    ResolutionParams {
        file: tmp.to_path_buf(),
        dpi,
    }
}

/// Plan the final write from the working file.
///
/// Quality is only passed for lossy formats.
pub fn plan_write(tmp: &Path, output: &Path, format: ImageFormat, quality: Quality) -> ConvertParams {
    ConvertParams {
        source: tmp.to_path_buf(),
        output: output.to_path_buf(),
        format,
        quality: format.is_lossy().then_some(quality),
    }
}
