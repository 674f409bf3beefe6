//! The seam to the external raster tool.
//!
//! [`RasterTool`] has one method per kind of invocation. The production
//! implementation is [`SipsTool`](super::sips::SipsTool), which spawns the
//! binary and waits for it; tests use the recording mock in [`tests`].

use super::params::{ConvertParams, GeometryParams, ResolutionParams};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("could not run {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("sips reported an error: {}", output.trim())]
    Failed { code: Option<i32>, output: String },
}

/// Blocking invocations of the external tool.
///
/// Each call returns once the tool has exited. A nonzero exit is a
/// [`ToolError::Failed`] carrying the tool's combined output.
pub trait RasterTool {
    /// Crop, pad or scale a file in place.
    fn geometry(&self, params: &GeometryParams) -> Result<(), ToolError>;

    /// Write a file out in another format (or the same one, re-encoded).
    fn convert(&self, params: &ConvertParams) -> Result<(), ToolError>;

    /// Set a file's DPI in place.
    fn set_resolution(&self, params: &ResolutionParams) -> Result<(), ToolError>;
}
