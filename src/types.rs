//! Value types shared by the argument parser, the planner and the orchestrator.
//!
//! Everything here is produced while parsing the command line and is read-only
//! once processing starts.

use clap::ValueEnum;
use std::fmt;

/// A geometric operation performed by the external tool.
///
/// The `c`/`p`/`s` names are what `-a/--action` accepts; the long names are
/// accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionKind {
    #[value(name = "c", alias = "crop")]
    Crop,
    #[value(name = "p", alias = "pad")]
    Pad,
    #[value(name = "s", alias = "scale")]
    Scale,
}

impl ActionKind {
    /// Human-readable name, used only in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Crop => "crop",
            ActionKind::Pad => "pad",
            ActionKind::Scale => "scale",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A target width or height as the user wrote it.
///
/// Symbolic values stay symbolic until they are resolved against a probed
/// image by [`crate::imaging::geometry::resolve_dimensions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// An explicit pixel count (always >= 1).
    Literal(u32),
    /// `x`: keep the image's own value for this axis.
    UseNative,
    /// `m` in the width slot: width = height × aspect ratio.
    DeriveFromHeight,
    /// `m` in the height slot: height = width ÷ aspect ratio.
    DeriveFromWidth,
}

/// One validated geometric transformation, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub width: Dimension,
    pub height: Dimension,
    /// Six hex digits, no prefix. Captured when the action was added.
    pub pad_colour: String,
}

/// Image formats this tool reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageFormat {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    #[value(alias = "tif")]
    Tiff,
}

impl ImageFormat {
    /// Format of the intermediate working file.
    pub const STAGING: ImageFormat = ImageFormat::Tiff;

    /// Match a file extension or a `-f` value, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(ext, true).ok()
    }

    /// Format of a path, judged by its extension.
    pub fn of_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// The name the external tool expects after `-s format`.
    pub fn tool_name(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// Lossy formats get a compression-quality argument on write.
    pub fn is_lossy(self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }
}

/// A requested output format plus the file extension to write it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFormat {
    pub format: ImageFormat,
    /// The user's spelling, lower-cased (`jpg` stays `jpg`).
    pub extension: String,
}

/// A cell of the 3×3 crop anchor grid: 0 = top-left … 8 = bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor(u8);

impl Anchor {
    /// The middle cell. As a crop origin it means "no anchoring".
    pub const CENTER: Anchor = Anchor(4);

    pub fn new(cell: u8) -> Option<Self> {
        (cell <= 8).then_some(Self(cell))
    }

    pub fn cell(self) -> u8 {
        self.0
    }

    pub fn row(self) -> u8 {
        self.0 / 3
    }

    pub fn col(self) -> u8 {
        self.0 % 3
    }

    pub fn is_center(self) -> bool {
        self == Self::CENTER
    }
}

/// Which rule places a crop window inside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropOrigin {
    /// Emit no offset arguments; the external tool decides.
    #[default]
    ToolDefault,
    /// Offsets computed from an anchor cell (never the center cell).
    Anchor(Anchor),
    /// Fixed pixel offsets from the top-left corner.
    Offset { x: u32, y: u32 },
}
