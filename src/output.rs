//! User-facing output.
//!
//! Every line the user sees is built by a pure `format_*` function and then
//! routed by [`Reporter`]:
//!
//! | Kind | Stream | Shown with `--quiet` |
//! |---|---|---|
//! | progress, header, summary | stdout | no |
//! | `--info` lines | stdout | yes |
//! | `[WARNING]` | stderr | no |
//! | `[ERROR]` | stderr | yes |
//!
//! ```text
//! Source: directory /photos/raw
//! Target: directory /photos/web
//! New DPI: 300
//! Image /photos/raw/a.png processed to /photos/web/a.png
//! [WARNING] Skipping /photos/raw/b.png: /photos/raw/b.png is empty
//! 1 file converted
//! ```

use crate::args::RunConfig;
use crate::imaging::ImageInfo;
use crate::paths::{Destination, Layout};
use crate::process::{ProcessError, ProcessEvent};
use std::error::Error;
use std::path::Path;

/// Exit status for a run stopped by SIGINT.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Exit status for every other error that ends a run.
pub const EXIT_FAILURE: u8 = 1;

/// One line of output and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Progress(String),
    Info(String),
    Warning(String),
    Error(String),
}

// ============================================================================
// Formatting
// ============================================================================

/// Up to four decimals, trailing zeros dropped: `72`, `1.3333`, `0.5`.
fn format_number(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// `<path> <width> <height> <dpi> <aspect ratio> alpha|no-alpha`
pub fn format_info_line(path: &Path, info: &ImageInfo) -> String {
    format!(
        "{} {} {} {} {} {}",
        path.display(),
        info.width,
        info.height,
        format_number(info.dpi),
        format_number(info.aspect_ratio),
        if info.has_alpha { "alpha" } else { "no-alpha" }
    )
}

pub fn format_summary(converted: usize) -> String {
    match converted {
        0 => "No files converted".to_string(),
        1 => "1 file converted".to_string(),
        n => format!("{n} files converted"),
    }
}

/// The lines printed before processing starts.
pub fn format_header(config: &RunConfig, layout: &Layout) -> Vec<String> {
    let source = match (&layout.source_dir, layout.sources.as_slice()) {
        (Some(dir), _) => format!("directory {}", dir.display()),
        (None, [single]) => single.display().to_string(),
        (None, files) => format!("{} files", files.len()),
    };
    let target = match &layout.destination {
        Destination::InPlace => "in place".to_string(),
        Destination::Directory(dir) => format!("directory {}", dir.display()),
        Destination::File(file) => file.display().to_string(),
    };

    let mut lines = vec![format!("Source: {source}"), format!("Target: {target}")];
    if let Some(target) = &config.target_format {
        lines.push(format!("New format: {}", target.extension));
    }
    if let Some(dpi) = config.dpi {
        lines.push(format!("New DPI: {dpi}"));
    }
    lines
}

pub fn format_event(event: &ProcessEvent) -> Line {
    match event {
        ProcessEvent::Info { path, info } => Line::Info(format_info_line(path, info)),
        ProcessEvent::Processed { source, output } => Line::Progress(format!(
            "Image {} processed to {}",
            source.display(),
            output.display()
        )),
        ProcessEvent::Skipped { path, reason } => {
            Line::Warning(format!("Skipping {}: {reason}", path.display()))
        }
        ProcessEvent::ToolFailed {
            path,
            stage,
            message,
        } => Line::Error(format!("{} ({stage}): {message}", path.display())),
        ProcessEvent::CleanupFailed { path, message } => {
            Line::Warning(format!("Could not delete {}: {message}", path.display()))
        }
    }
}

/// The `[ERROR]` text and exit status for an error that ends the run.
pub fn format_fatal(error: &(dyn Error + 'static)) -> (String, u8) {
    match error.downcast_ref::<ProcessError>() {
        Some(ProcessError::Interrupted) => (format!("{error}, stopping"), EXIT_INTERRUPTED),
        None => (error.to_string(), EXIT_FAILURE),
    }
}

// ============================================================================
// Routing
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn emit(&self, line: &Line) {
        match line {
            Line::Progress(text) if !self.quiet => println!("{text}"),
            Line::Info(text) => println!("{text}"),
            Line::Warning(text) if !self.quiet => eprintln!("[WARNING] {text}"),
            Line::Error(text) => eprintln!("[ERROR] {text}"),
            _ => {}
        }
    }

    pub fn progress(&self, text: &str) {
        self.emit(&Line::Progress(text.to_string()));
    }

    pub fn warning(&self, text: &str) {
        self.emit(&Line::Warning(text.to_string()));
    }

    pub fn error(&self, text: &str) {
        self.emit(&Line::Error(text.to_string()));
    }

    pub fn event(&self, event: &ProcessEvent) {
        self.emit(&format_event(event));
    }
}

// ============================================================================
// Help
// ============================================================================

pub fn help_text() -> &'static str {
    "\
imageprep - batch crop, pad, scale and convert images with sips

Usage: imageprep [options] [file ...]

Sources and destination:
  -s, --source <path>        Directory or single image (default: current directory)
  [file ...]                 Image files to process instead of --source
  -d, --destination <path>   Output directory or file (default: overwrite in place)
      --createdirs           Create missing destination directories
  -o, --overwrite            Replace existing files when reformatting
  -x, --deletesource         Delete each source after a successful conversion
  -k, --keep                 Keep sources (cancels an earlier -x)

Actions (applied in the order given):
  -a, --action <c|p|s> <width> <height>
                             Crop, pad or scale. Width and height are pixels,
                             x (keep this dimension) or m (keep aspect ratio)
  -c, --colour <hex>         Pad colour for the actions that follow (default FFFFFF)
      --cropfrom <anchor>    Crop anchor: 0-8, or tl tc tr cl cc cr bl bc br
      --offset <x> <y>       Crop offset in pixels from the top-left corner
  -r, --resolution <dpi>     Set the DPI
  -f, --format <fmt>         Convert to png, jpg, jpeg, tif or tiff
  -j, --jpeg <percent>       JPEG compression quality (default 80)

Other:
      --info                 Print size, DPI, aspect ratio and alpha for each image
  -q, --quiet                Only print errors
  -v, --verbose              Debug logging (RUST_LOG overrides)
      --gen-config           Print a documented settings file
  -h, --help                 Show this help
      --version              Show version

Settings are read from the file named by IMAGEPREP_CONFIG, if set.
"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Stage;
    use crate::test_helpers::base_config;
    use crate::types::{ActionKind, ImageFormat, TargetFormat};
    use std::path::PathBuf;

    fn layout(sources: Vec<&str>, source_dir: Option<&str>, destination: Destination) -> Layout {
        Layout {
            sources: sources.into_iter().map(PathBuf::from).collect(),
            source_dir: source_dir.map(PathBuf::from),
            destination,
            delete_sources: false,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn summary_pluralization() {
        assert_eq!(format_summary(0), "No files converted");
        assert_eq!(format_summary(1), "1 file converted");
        assert_eq!(format_summary(7), "7 files converted");
    }

    #[test]
    fn info_line_layout() {
        let info = ImageInfo::new(800, 600, 72.0, false);
        assert_eq!(
            format_info_line(Path::new("/p/a.png"), &info),
            "/p/a.png 800 600 72 1.3333 no-alpha"
        );

        let info = ImageInfo::new(300, 600, 240.5, true);
        assert_eq!(
            format_info_line(Path::new("b.tif"), &info),
            "b.tif 300 600 240.5 0.5 alpha"
        );
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(72.0), "72");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.00001), "0");
        assert_eq!(format_number(2.0 / 3.0), "0.6667");
    }

    #[test]
    fn header_for_directory_run() {
        let mut config = base_config();
        config.dpi = Some(300);
        let lines = format_header(
            &config,
            &layout(
                vec!["/in/a.png"],
                Some("/in"),
                Destination::Directory("/out".into()),
            ),
        );
        assert_eq!(
            lines,
            vec![
                "Source: directory /in",
                "Target: directory /out",
                "New DPI: 300"
            ]
        );
    }

    #[test]
    fn header_for_file_list_in_place() {
        let mut config = base_config();
        config.target_format = Some(TargetFormat {
            format: ImageFormat::Jpeg,
            extension: "jpg".into(),
        });
        let lines = format_header(
            &config,
            &layout(vec!["/a.png", "/b.png"], None, Destination::InPlace),
        );
        assert_eq!(
            lines,
            vec!["Source: 2 files", "Target: in place", "New format: jpg"]
        );
    }

    #[test]
    fn header_for_single_file() {
        let lines = format_header(
            &base_config(),
            &layout(
                vec!["/a.png"],
                None,
                Destination::File("/out/b.png".into()),
            ),
        );
        assert_eq!(lines, vec!["Source: /a.png", "Target: /out/b.png"]);
    }

    #[test]
    fn events_map_to_line_kinds() {
        let processed = format_event(&ProcessEvent::Processed {
            source: "/in/a.png".into(),
            output: "/out/a.png".into(),
        });
        assert_eq!(
            processed,
            Line::Progress("Image /in/a.png processed to /out/a.png".into())
        );

        let failed = format_event(&ProcessEvent::ToolFailed {
            path: "/in/a.png".into(),
            stage: Stage::Action(ActionKind::Crop),
            message: "sips reported an error: boom".into(),
        });
        assert_eq!(
            failed,
            Line::Error("/in/a.png (crop): sips reported an error: boom".into())
        );

        assert!(matches!(
            format_event(&ProcessEvent::Skipped {
                path: "/a".into(),
                reason: "empty".into()
            }),
            Line::Warning(_)
        ));
        assert!(matches!(
            format_event(&ProcessEvent::CleanupFailed {
                path: "/a".into(),
                message: "denied".into()
            }),
            Line::Warning(_)
        ));
    }

    #[test]
    fn interrupt_maps_to_130() {
        let error: Box<dyn Error> = Box::new(ProcessError::Interrupted);
        let (message, code) = format_fatal(error.as_ref());
        assert_eq!(code, EXIT_INTERRUPTED);
        assert_eq!(message, "Interrupted by user, stopping");
    }

    #[test]
    fn other_errors_map_to_1() {
        let error: Box<dyn Error> = Box::new(crate::args::ArgError::NoActions);
        assert_eq!(
            format_fatal(error.as_ref()),
            ("No actions specified".to_string(), EXIT_FAILURE)
        );
    }

    #[test]
    fn help_mentions_every_flag() {
        let help = help_text();
        for flag in [
            "--source",
            "--destination",
            "--action",
            "--colour",
            "--cropfrom",
            "--offset",
            "--resolution",
            "--format",
            "--jpeg",
            "--overwrite",
            "--deletesource",
            "--createdirs",
            "--info",
            "--quiet",
            "--help",
            "--version",
        ] {
            assert!(help.contains(flag), "help is missing {flag}");
        }
    }
}
