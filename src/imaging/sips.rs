//! Production [`RasterTool`]: runs the external binary as a subprocess.

use super::params::{ConvertParams, GeometryParams, ResolutionParams};
use super::tool::{RasterTool, ToolError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone)]
pub struct SipsTool {
    program: PathBuf,
}

impl SipsTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool to completion, returning its combined stdout and stderr.
    fn run(&self, args: &[OsString]) -> Result<String, ToolError> {
        log::debug!(
            "{} {}",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| ToolError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(text)
        } else {
            Err(ToolError::Failed {
                code: output.status.code(),
                output: text,
            })
        }
    }
}

impl RasterTool for SipsTool {
    fn geometry(&self, params: &GeometryParams) -> Result<(), ToolError> {
        self.run(&params.to_args()).map(drop)
    }

    fn convert(&self, params: &ConvertParams) -> Result<(), ToolError> {
        self.run(&params.to_args()).map(drop)
    }

    fn set_resolution(&self, params: &ResolutionParams) -> Result<(), ToolError> {
        self.run(&params.to_args()).map(drop)
    }
}
