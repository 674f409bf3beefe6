//! Parameter types for external tool invocations.
//!
//! These structs describe *what* to ask the tool for, not how it is run. The
//! planning functions in [`operations`](super::operations) build them; a
//! [`RasterTool`](super::tool::RasterTool) executes them. Each record knows
//! how to render itself as an argument vector, which is the only place the
//! tool's command-line grammar appears.
//!
//! ## Types
//!
//! - [`Quality`]: lossy compression percentage, (0, 100].
//! - [`GeometryParams`]: crop, pad or scale a file in place.
//! - [`ConvertParams`]: write a file out in a given format.
//! - [`ResolutionParams`]: set a file's DPI in place.

use super::geometry::CropOffset;
use crate::types::{ActionKind, ImageFormat};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Compression quality for lossy output, as a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f64);

impl Quality {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80.0)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Crop, pad or scale `file` in place.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryParams {
    pub file: PathBuf,
    pub kind: ActionKind,
    pub width: u32,
    pub height: u32,
    pub offset: Option<CropOffset>,
    /// `None` for scales, which would otherwise lose the alpha channel.
    pub pad_colour: Option<String>,
}

impl GeometryParams {
    /// `<file> <verb> <height> <width> [--cropOffset y x] [--padColor RRGGBB]`
    pub fn to_args(&self) -> Vec<OsString> {
        let verb = match self.kind {
            ActionKind::Crop => "-c",
            ActionKind::Pad => "-p",
            ActionKind::Scale => "-z",
        };
        let mut args = vec![
            self.file.clone().into_os_string(),
            verb.into(),
            self.height.to_string().into(),
            self.width.to_string().into(),
        ];
        if let Some(offset) = self.offset {
            args.push("--cropOffset".into());
            args.push(offset.y.to_string().into());
            args.push(offset.x.to_string().into());
        }
        if let Some(colour) = &self.pad_colour {
            args.push("--padColor".into());
            args.push(colour.into());
        }
        args
    }
}

/// Write `source` to `output` as `format`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: ImageFormat,
    pub quality: Option<Quality>,
}

impl ConvertParams {
    /// `<source> -s format <fmt> --out <output> [-s formatOptions <quality>]`
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args = vec![
            self.source.clone().into_os_string(),
            "-s".into(),
            "format".into(),
            self.format.tool_name().into(),
            "--out".into(),
            self.output.clone().into_os_string(),
        ];
        if let Some(quality) = self.quality {
            args.push("-s".into());
            args.push("formatOptions".into());
            args.push(quality.to_string().into());
        }
        args
    }
}

/// Set the DPI of `file` in place, both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionParams {
    pub file: PathBuf,
    pub dpi: u32,
}

impl ResolutionParams {
    /// `<file> -s dpiHeight <n> -s dpiWidth <n>`
    pub fn to_args(&self) -> Vec<OsString> {
        let dpi = self.dpi.to_string();
        vec![
            self.file.clone().into_os_string(),
            "-s".into(),
            "dpiHeight".into(),
            dpi.clone().into(),
            "-s".into(),
            "dpiWidth".into(),
            dpi.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn quality_clamps_to_percentage() {
        assert_eq!(Quality::new(150.0).value(), 100.0);
        assert_eq!(Quality::new(-3.0).value(), 0.0);
        assert_eq!(Quality::new(62.5).value(), 62.5);
    }

    #[test]
    fn quality_prints_without_trailing_zeros() {
        assert_eq!(Quality::new(80.0).to_string(), "80");
        assert_eq!(Quality::new(72.5).to_string(), "72.5");
    }

    #[test]
    fn crop_with_offset_and_colour() {
        let params = GeometryParams {
            file: "/w/a.png.sipstmp".into(),
            kind: ActionKind::Crop,
            width: 400,
            height: 300,
            offset: Some(CropOffset { x: 0.0001, y: 150.0 }),
            pad_colour: Some("FFFFFF".into()),
        };
        assert_eq!(
            strings(params.to_args()),
            vec![
                "/w/a.png.sipstmp",
                "-c",
                "300",
                "400",
                "--cropOffset",
                "150",
                "0.0001",
                "--padColor",
                "FFFFFF"
            ]
        );
    }

    #[test]
    fn scale_without_colour() {
        let params = GeometryParams {
            file: "/w/a.tmp".into(),
            kind: ActionKind::Scale,
            width: 400,
            height: 300,
            offset: None,
            pad_colour: None,
        };
        assert_eq!(
            strings(params.to_args()),
            vec!["/w/a.tmp", "-z", "300", "400"]
        );
    }

    #[test]
    fn pad_verb() {
        let params = GeometryParams {
            file: "f".into(),
            kind: ActionKind::Pad,
            width: 10,
            height: 20,
            offset: None,
            pad_colour: Some("000000".into()),
        };
        assert_eq!(
            strings(params.to_args()),
            vec!["f", "-p", "20", "10", "--padColor", "000000"]
        );
    }

    #[test]
    fn convert_with_quality() {
        let params = ConvertParams {
            source: "/w/a.tmp".into(),
            output: "/out/a.jpg".into(),
            format: ImageFormat::Jpeg,
            quality: Some(Quality::new(75.0)),
        };
        assert_eq!(
            strings(params.to_args()),
            vec![
                "/w/a.tmp",
                "-s",
                "format",
                "jpeg",
                "--out",
                "/out/a.jpg",
                "-s",
                "formatOptions",
                "75"
            ]
        );
    }

    #[test]
    fn convert_without_quality() {
        let params = ConvertParams {
            source: "/in/a.png".into(),
            output: "/out/a.png.sipstmp".into(),
            format: ImageFormat::Tiff,
            quality: None,
        };
        assert_eq!(
            strings(params.to_args()),
            vec![
                "/in/a.png",
                "-s",
                "format",
                "tiff",
                "--out",
                "/out/a.png.sipstmp"
            ]
        );
    }

    #[test]
    fn resolution_sets_both_axes() {
        let params = ResolutionParams {
            file: "/w/a.tmp".into(),
            dpi: 300,
        };
        assert_eq!(
            strings(params.to_args()),
            vec!["/w/a.tmp", "-s", "dpiHeight", "300", "-s", "dpiWidth", "300"]
        );
    }
}
