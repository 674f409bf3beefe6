//! Per-file transformation.
//!
//! Each input file goes through the same fixed sequence:
//!
//! ```text
//! probe ─┬─ info only ──► print info line, done
//!        │
//!        └─► stage working copy (<output>.sipstmp, TIFF)
//!              └─► each action, in order
//!                    └─► set DPI (if requested)
//!                          └─► write final output (reformat or write back)
//!                                └─► remove working copy
//!                                      └─► delete source (if allowed)
//! ```
//!
//! ## Failure Handling
//!
//! - A file that cannot be probed, or whose reformatted output already
//!   exists without `--overwrite`, is skipped. The batch continues.
//! - A tool invocation that fails is reported and the remaining steps for
//!   that file still run.
//! - Failing to remove the working copy or the source is reported only.
//! - An interrupt stops the run before the next tool invocation, removing
//!   the current working copy.
//!
//! Everything the user should see is sent through the `on_event` callback
//! as a [`ProcessEvent`]; this module never prints.

use crate::args::RunConfig;
use crate::imaging::operations::{
    Staging, plan_action, plan_resolution, plan_staging, plan_write, reformatted_path,
    staging_path,
};
use crate::imaging::{ImageInfo, RasterTool, ToolError, probe};
use crate::interrupt::Cancellation;
use crate::paths::Layout;
use crate::types::{ActionKind, ImageFormat};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Interrupted by user")]
    Interrupted,
}

/// Which tool invocation a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Staging,
    Action(ActionKind),
    Resolution,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Staging => f.write_str("staging"),
            Stage::Action(kind) => write!(f, "{kind}"),
            Stage::Resolution => f.write_str("resolution"),
            Stage::Write => f.write_str("write"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// `--info` result for one file.
    Info { path: PathBuf, info: ImageInfo },
    Processed { source: PathBuf, output: PathBuf },
    Skipped { path: PathBuf, reason: String },
    ToolFailed {
        path: PathBuf,
        stage: Stage,
        message: String,
    },
    CleanupFailed { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub converted: usize,
    pub skipped: usize,
    pub described: usize,
}

enum FileOutcome {
    Converted,
    Skipped,
    Described,
}

/// Process every source in the layout, in order.
pub fn process<T, F>(
    config: &RunConfig,
    layout: &Layout,
    tool: &T,
    cancel: &Cancellation,
    on_event: F,
) -> Result<RunSummary, ProcessError>
where
    T: RasterTool,
    F: FnMut(ProcessEvent),
{
    let mut run = Orchestrator {
        config,
        layout,
        tool,
        cancel,
        on_event,
    };
    let mut summary = RunSummary::default();

    for source in &layout.sources {
        if cancel.is_cancelled() {
            return Err(ProcessError::Interrupted);
        }
        match run.process_file(source)? {
            FileOutcome::Converted => summary.converted += 1,
            FileOutcome::Skipped => summary.skipped += 1,
            FileOutcome::Described => summary.described += 1,
        }
    }

    log::debug!("{summary:?}");
    Ok(summary)
}

struct Orchestrator<'a, T, F> {
    config: &'a RunConfig,
    layout: &'a Layout,
    tool: &'a T,
    cancel: &'a Cancellation,
    on_event: F,
}

impl<T, F> Orchestrator<'_, T, F>
where
    T: RasterTool,
    F: FnMut(ProcessEvent),
{
    fn process_file(&mut self, source: &Path) -> Result<FileOutcome, ProcessError> {
        let config = self.config;
        let output = self.layout.destination.output_for(source);
        log::debug!("{} -> {}", source.display(), output.display());

        let info = match probe(source) {
            Ok(info) => info,
            Err(e) => return Ok(self.skip(source, e.to_string())),
        };

        if config.info_only {
            self.emit(ProcessEvent::Info {
                path: source.to_path_buf(),
                info,
            });
            return Ok(FileOutcome::Described);
        }

        let (final_path, format) = self.final_target(source, &output);
        if config.target_format.is_some() && final_path.exists() && !config.overwrite {
            let reason = format!(
                "{} already exists -- use -o to overwrite",
                final_path.display()
            );
            return Ok(self.skip(source, reason));
        }

        let tmp = staging_path(&output);
        match plan_staging(source, &output, &tmp) {
            Staging::Copy { from, to } => {
                if let Err(e) = fs::copy(&from, &to) {
                    let reason = format!("cannot copy to {}: {e}", to.display());
                    return Ok(self.skip(source, reason));
                }
            }
            Staging::Convert(params) => {
                self.invoke(source, &tmp, Stage::Staging, |tool| tool.convert(&params))?
            }
        }

        for action in &config.actions {
            let params = plan_action(action, &info, config.crop_origin, &tmp);
            self.invoke(source, &tmp, Stage::Action(action.kind), |tool| {
                tool.geometry(&params)
            })?;
        }

        if let Some(dpi) = config.dpi {
            let params = plan_resolution(&tmp, dpi);
            self.invoke(source, &tmp, Stage::Resolution, |tool| {
                tool.set_resolution(&params)
            })?;
        }

        let params = plan_write(&tmp, &final_path, format, config.jpeg_quality);
        self.invoke(source, &tmp, Stage::Write, |tool| tool.convert(&params))?;

        if tmp.exists() {
            if let Err(e) = fs::remove_file(&tmp) {
                self.emit(ProcessEvent::CleanupFailed {
                    path: tmp.clone(),
                    message: e.to_string(),
                });
            }
        }

        if self.layout.delete_sources && source != final_path {
            log::debug!("deleting source {}", source.display());
            if let Err(e) = fs::remove_file(source) {
                self.emit(ProcessEvent::CleanupFailed {
                    path: source.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }

        self.emit(ProcessEvent::Processed {
            source: source.to_path_buf(),
            output: final_path,
        });
        Ok(FileOutcome::Converted)
    }

    /// Final output path and the format to write it in.
    ///
    /// Without `-f` the format follows the output path's extension, which
    /// only differs from the source's for a file destination.
    fn final_target(&self, source: &Path, output: &Path) -> (PathBuf, ImageFormat) {
        match &self.config.target_format {
            Some(target) => (reformatted_path(output, &target.extension), target.format),
            None => {
                let format = ImageFormat::of_path(output)
                    .or_else(|| ImageFormat::of_path(source))
                    .unwrap_or(ImageFormat::STAGING);
                (output.to_path_buf(), format)
            }
        }
    }

    /// Run one tool invocation, reporting a failure without stopping.
    fn invoke(
        &mut self,
        source: &Path,
        tmp: &Path,
        stage: Stage,
        call: impl FnOnce(&T) -> Result<(), ToolError>,
    ) -> Result<(), ProcessError> {
        self.check_cancelled(tmp)?;
        log::debug!("{stage}: {}", source.display());

        if let Err(e) = call(self.tool) {
            self.emit(ProcessEvent::ToolFailed {
                path: source.to_path_buf(),
                stage,
                message: e.to_string(),
            });
        }
        self.check_cancelled(tmp)
    }

    fn check_cancelled(&self, tmp: &Path) -> Result<(), ProcessError> {
        if !self.cancel.is_cancelled() {
            return Ok(());
        }
        if tmp.exists() {
            let _ = fs::remove_file(tmp);
        }
        Err(ProcessError::Interrupted)
    }

    fn skip(&mut self, source: &Path, reason: String) -> FileOutcome {
        self.emit(ProcessEvent::Skipped {
            path: source.to_path_buf(),
            reason,
        });
        FileOutcome::Skipped
    }

    fn emit(&mut self, event: ProcessEvent) {
        (self.on_event)(event);
    }
}
