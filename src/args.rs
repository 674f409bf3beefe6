//! Command-line interpretation.
//!
//! The argument list is consumed once, left to right, by a small state
//! machine. In the [`Expecting::Flag`] state a flag-shaped token (one that
//! starts with `-`) is looked up in the flag table; anything else is taken as
//! a source file, which is what makes `imageprep -a s 800 m *.png` work.
//! Every other state names the value slot the next token fills. Multi-value
//! flags (`-a kind width height`, `--offset x y`) walk through consecutive
//! slots, carrying what they have read so far inside the state itself.
//!
//! Parsing performs no I/O. Paths stay as the user typed them until
//! [`crate::paths`] resolves them.

use crate::actions::ActionListBuilder;
use crate::config::DefaultsSettings;
use crate::imaging::Quality;
use crate::types::{
    Action, ActionKind, Anchor, CropOrigin, Dimension, ImageFormat, TargetFormat,
};
use clap::ValueEnum;
use std::ffi::OsString;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgError {
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("Unknown argument: {0}")]
    UnknownFlag(String),
    #[error("Invalid hex colour value supplied {0}")]
    InvalidColour(String),
    #[error("Invalid image format selected: {0}")]
    InvalidFormat(String),
    #[error("Invalid action selected: {0}")]
    InvalidActionKind(String),
    #[error("Invalid {kind} {axis} value: {value}")]
    InvalidDimension {
        kind: ActionKind,
        axis: Axis,
        value: String,
    },
    #[error("Invalid crop anchor point: {0}")]
    InvalidAnchor(String),
    #[error("Invalid crop offset: {0}")]
    InvalidOffset(String),
    #[error("Invalid JPEG compression level: {0}")]
    InvalidCompression(String),
    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),
    #[error("--source cannot be combined with a list of source files")]
    SourceConflict,
    #[error("No actions specified")]
    NoActions,
    #[error("Argument is not valid UTF-8: {0}")]
    NotUnicode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Width => f.write_str("width"),
            Axis::Height => f.write_str("height"),
        }
    }
}

/// Where the images come from, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// `-s path`, or the working directory when nothing was given.
    Path(String),
    /// Bare file names collected from the argument list.
    Files(Vec<String>),
}

/// Everything the run needs, fixed once parsing completes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub source: SourceSpec,
    pub destination: Option<String>,
    pub actions: Vec<Action>,
    pub target_format: Option<TargetFormat>,
    pub dpi: Option<u32>,
    pub jpeg_quality: Quality,
    pub crop_origin: CropOrigin,
    pub overwrite: bool,
    pub delete_source: bool,
    pub create_dirs: bool,
    pub info_only: bool,
    pub quiet: bool,
    pub verbose: bool,
}

/// A parsed run plus the non-fatal warnings raised while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config: RunConfig,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Run(Invocation),
    Help,
    Version,
    GenConfig,
}

/// The value slot the next token fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expecting {
    Flag,
    Source,
    Destination,
    Colour,
    Resolution,
    Format,
    Compression,
    AnchorPoint,
    OffsetX,
    OffsetY { x: u32 },
    ActionType,
    ActionWidth { kind: ActionKind },
    ActionHeight { kind: ActionKind, width: Dimension },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    Overwrite,
    DeleteSource,
    KeepSource,
    CreateDirs,
    InfoOnly,
    Quiet,
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagEffect {
    Expect(Expecting),
    Set(Switch),
    Exit(Exit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Help,
    Version,
    GenConfig,
}

/// The flag table.
fn flag_effect(flag: &str) -> Option<FlagEffect> {
    let effect = match flag {
        "-s" | "--source" => FlagEffect::Expect(Expecting::Source),
        "-d" | "--destination" => FlagEffect::Expect(Expecting::Destination),
        "-a" | "--action" => FlagEffect::Expect(Expecting::ActionType),
        "-c" | "--colour" | "--color" => FlagEffect::Expect(Expecting::Colour),
        "--cropfrom" => FlagEffect::Expect(Expecting::AnchorPoint),
        "--offset" => FlagEffect::Expect(Expecting::OffsetX),
        "-r" | "--resolution" => FlagEffect::Expect(Expecting::Resolution),
        "-f" | "--format" => FlagEffect::Expect(Expecting::Format),
        "-j" | "--jpeg" => FlagEffect::Expect(Expecting::Compression),
        "-o" | "--overwrite" => FlagEffect::Set(Switch::Overwrite),
        "-x" | "--deletesource" => FlagEffect::Set(Switch::DeleteSource),
        "-k" | "--keep" => FlagEffect::Set(Switch::KeepSource),
        "--createdirs" => FlagEffect::Set(Switch::CreateDirs),
        "--info" => FlagEffect::Set(Switch::InfoOnly),
        "-q" | "--quiet" => FlagEffect::Set(Switch::Quiet),
        "-v" | "--verbose" => FlagEffect::Set(Switch::Verbose),
        "-h" | "--help" => FlagEffect::Exit(Exit::Help),
        "--version" => FlagEffect::Exit(Exit::Version),
        "--gen-config" => FlagEffect::Exit(Exit::GenConfig),
        _ => return None,
    };
    Some(effect)
}

fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

/// Settings accumulated while the token stream is consumed.
#[derive(Debug, Clone)]
pub struct Draft {
    source_path: Option<String>,
    files: Vec<String>,
    destination: Option<String>,
    pad_colour: String,
    actions: ActionListBuilder,
    warnings: Vec<String>,
    target_format: Option<TargetFormat>,
    dpi: Option<u32>,
    quality: Option<Quality>,
    anchor: Option<Anchor>,
    offset: Option<(u32, u32)>,
    overwrite: bool,
    delete_source: bool,
    create_dirs: bool,
    info_only: bool,
    quiet: bool,
    verbose: bool,
}

impl Draft {
    pub fn new(defaults: &DefaultsSettings) -> Self {
        Self {
            source_path: None,
            files: Vec::new(),
            destination: None,
            pad_colour: defaults.pad_colour.clone(),
            actions: ActionListBuilder::new(),
            warnings: Vec::new(),
            target_format: None,
            dpi: None,
            quality: None,
            anchor: None,
            offset: None,
            overwrite: false,
            delete_source: false,
            create_dirs: false,
            info_only: false,
            quiet: false,
            verbose: false,
        }
    }

    fn set(&mut self, switch: Switch) {
        match switch {
            Switch::Overwrite => self.overwrite = true,
            Switch::DeleteSource => self.delete_source = true,
            Switch::KeepSource => self.delete_source = false,
            Switch::CreateDirs => self.create_dirs = true,
            Switch::InfoOnly => self.info_only = true,
            Switch::Quiet => self.quiet = true,
            Switch::Verbose => self.verbose = true,
        }
    }

    fn finish(self, defaults: &DefaultsSettings) -> Result<Invocation, ArgError> {
        let source = match (self.source_path, self.files.is_empty()) {
            (Some(_), false) => return Err(ArgError::SourceConflict),
            (Some(path), true) => SourceSpec::Path(path),
            (None, false) => SourceSpec::Files(self.files),
            (None, true) => SourceSpec::Path(".".to_string()),
        };

        if self.actions.is_empty()
            && self.target_format.is_none()
            && self.dpi.is_none()
            && !self.info_only
        {
            return Err(ArgError::NoActions);
        }

        // A non-center anchor wins over an explicit offset.
        let crop_origin = match (self.anchor, self.offset) {
            (Some(anchor), _) if !anchor.is_center() => CropOrigin::Anchor(anchor),
            (_, Some((x, y))) => CropOrigin::Offset { x, y },
            _ => CropOrigin::ToolDefault,
        };

        Ok(Invocation {
            config: RunConfig {
                source,
                destination: self.destination,
                actions: self.actions.build(),
                target_format: self.target_format,
                dpi: self.dpi,
                jpeg_quality: self
                    .quality
                    .unwrap_or_else(|| Quality::new(defaults.jpeg_quality)),
                crop_origin,
                overwrite: self.overwrite,
                delete_source: self.delete_source,
                create_dirs: self.create_dirs,
                info_only: self.info_only,
                quiet: self.quiet,
                verbose: self.verbose,
            },
            warnings: self.warnings,
        })
    }
}

/// Feed one non-flag token to the machine and return the next state.
pub fn transition(state: Expecting, token: &str, draft: &mut Draft) -> Result<Expecting, ArgError> {
    match state {
        Expecting::Flag => draft.files.push(token.to_string()),
        Expecting::Source => draft.source_path = Some(token.to_string()),
        Expecting::Destination => draft.destination = Some(token.to_string()),
        Expecting::Colour => draft.pad_colour = process_colour(token)?,
        Expecting::Resolution => draft.dpi = Some(process_resolution(token)?),
        Expecting::Format => draft.target_format = Some(process_format(token)?),
        Expecting::Compression => draft.quality = Some(process_compression(token)?),
        Expecting::AnchorPoint => draft.anchor = Some(process_anchor(token)?),
        Expecting::OffsetX => {
            let x = process_offset(token)?;
            return Ok(Expecting::OffsetY { x });
        }
        Expecting::OffsetY { x } => draft.offset = Some((x, process_offset(token)?)),
        Expecting::ActionType => {
            let kind = process_action_kind(token)?;
            return Ok(Expecting::ActionWidth { kind });
        }
        Expecting::ActionWidth { kind } => {
            let width = process_dimension(token, kind, Axis::Width)?;
            return Ok(Expecting::ActionHeight { kind, width });
        }
        Expecting::ActionHeight { kind, width } => {
            let height = process_dimension(token, kind, Axis::Height)?;
            let outcome = draft.actions.add(kind, width, height, &draft.pad_colour);
            draft.warnings.extend(outcome.warning());
        }
    }
    Ok(Expecting::Flag)
}

/// Take raw arguments as strings, rejecting any that are not UTF-8.
pub fn utf8_args<I>(args: I) -> Result<Vec<String>, ArgError>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| ArgError::NotUnicode(raw.to_string_lossy().into_owned()))
        })
        .collect()
}

/// Parse the arguments that follow the program name.
pub fn parse<I, S>(args: I, defaults: &DefaultsSettings) -> Result<ParseOutcome, ArgError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut draft = Draft::new(defaults);
    let mut state = Expecting::Flag;
    let mut last_flag = String::new();

    for token in args {
        let token = token.as_ref();

        if !is_flag(token) {
            state = transition(state, token, &mut draft)?;
            continue;
        }

        if state != Expecting::Flag {
            return Err(ArgError::MissingValue(last_flag));
        }

        match flag_effect(token).ok_or_else(|| ArgError::UnknownFlag(token.to_string()))? {
            FlagEffect::Expect(next) => state = next,
            FlagEffect::Set(switch) => draft.set(switch),
            FlagEffect::Exit(Exit::Help) => return Ok(ParseOutcome::Help),
            FlagEffect::Exit(Exit::Version) => return Ok(ParseOutcome::Version),
            FlagEffect::Exit(Exit::GenConfig) => return Ok(ParseOutcome::GenConfig),
        }
        last_flag = token.to_string();
    }

    if state != Expecting::Flag {
        return Err(ArgError::MissingValue(last_flag));
    }

    draft.finish(defaults).map(ParseOutcome::Run)
}

// ============================================================================
// Value validation
// ============================================================================

const COLOUR_PREFIXES: &[&str] = &["#", "0x", "\\x", "x", "$"];

/// Normalize a hex colour to six digits without any prefix.
///
/// `#a1b2c3`, `0xa1b2c3` and `a1b2c3` all give `a1b2c3`; short values are
/// left-padded with zeros, so `f` gives `00000f`.
pub fn process_colour(value: &str) -> Result<String, ArgError> {
    let mut work = value;
    while let Some(rest) = COLOUR_PREFIXES
        .iter()
        .find_map(|prefix| work.strip_prefix(prefix))
    {
        work = rest;
    }

    if work.is_empty() || work.len() > 6 || !work.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ArgError::InvalidColour(value.to_string()));
    }

    Ok(format!("{work:0>6}"))
}

/// Validate a `-f` value.
pub fn process_format(value: &str) -> Result<TargetFormat, ArgError> {
    let format = ImageFormat::from_extension(value)
        .ok_or_else(|| ArgError::InvalidFormat(value.to_string()))?;
    Ok(TargetFormat {
        format,
        extension: value.to_lowercase(),
    })
}

pub fn process_action_kind(value: &str) -> Result<ActionKind, ArgError> {
    <ActionKind as ValueEnum>::from_str(value, true)
        .map_err(|_| ArgError::InvalidActionKind(value.to_string()))
}

/// Validate an action width or height: a positive integer, `x` or `m`.
pub fn process_dimension(value: &str, kind: ActionKind, axis: Axis) -> Result<Dimension, ArgError> {
    match value.to_lowercase().as_str() {
        "x" => return Ok(Dimension::UseNative),
        "m" => {
            return Ok(match axis {
                Axis::Width => Dimension::DeriveFromHeight,
                Axis::Height => Dimension::DeriveFromWidth,
            });
        }
        _ => {}
    }

    match value.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(Dimension::Literal(n)),
        _ => Err(ArgError::InvalidDimension {
            kind,
            axis,
            value: value.to_string(),
        }),
    }
}

/// Validate a crop anchor: `0`–`8`, or a row letter (`t`/`c`/`b`) followed by
/// a column letter (`l`/`c`/`r`), e.g. `br` for bottom-right.
pub fn process_anchor(value: &str) -> Result<Anchor, ArgError> {
    let invalid = || ArgError::InvalidAnchor(value.to_string());

    if let Ok(cell) = value.parse::<u8>() {
        return Anchor::new(cell).ok_or_else(invalid);
    }

    let code = value.to_lowercase();
    let mut chars = code.chars();
    let (Some(row), Some(col), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(invalid());
    };
    let row = match row {
        't' => 0,
        'c' => 1,
        'b' => 2,
        _ => return Err(invalid()),
    };
    let col = match col {
        'l' => 0,
        'c' => 1,
        'r' => 2,
        _ => return Err(invalid()),
    };
    Anchor::new(row * 3 + col).ok_or_else(invalid)
}

pub fn process_offset(value: &str) -> Result<u32, ArgError> {
    value
        .parse::<u32>()
        .map_err(|_| ArgError::InvalidOffset(value.to_string()))
}

/// Validate a JPEG compression percentage, with or without a trailing `%`.
pub fn process_compression(value: &str) -> Result<Quality, ArgError> {
    let number = value.split('%').next().unwrap_or_default();
    match number.trim().parse::<f64>() {
        Ok(q) if q.is_finite() && q > 0.0 && q <= 100.0 => Ok(Quality::new(q)),
        _ => Err(ArgError::InvalidCompression(value.to_string())),
    }
}

pub fn process_resolution(value: &str) -> Result<u32, ArgError> {
    match value.parse::<u32>() {
        Ok(dpi) if dpi >= 1 => Ok(dpi),
        _ => Err(ArgError::InvalidResolution(value.to_string())),
    }
}
