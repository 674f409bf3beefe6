//! # imageprep
//!
//! Batch crop, pad, scale, re-resolution and format conversion of raster
//! images, driven from the command line. The pixel work itself is done by an
//! external tool (macOS `sips`); this crate decides *what* to ask it for.
//!
//! # Pipeline
//!
//! ```text
//! argv ──► args::parse ──► RunConfig
//!                              │
//!                              ▼
//!                     paths::plan_layout ──► Layout (sources, destination)
//!                              │
//!                              ▼
//!                     process::process ──► ProcessEvent ──► output::Reporter
//!                              │
//!                              ▼
//!                     imaging::RasterTool (sips)
//! ```
//!
//! Everything up to the tool boundary is pure or filesystem-only, so the
//! whole pipeline is tested against [`imaging::tool`]'s recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`args`] | Token-by-token command-line state machine and value validators |
//! | [`actions`] | Ordered action list with no-op filtering |
//! | [`types`] | Action kinds, dimensions, formats, crop anchors |
//! | [`paths`] | Source enumeration, destination classification, deletion rule |
//! | [`imaging`] | Probe, geometry arithmetic, tool argument building, `sips` driver |
//! | [`process`] | Per-file orchestration: stage, act, set DPI, write, clean up |
//! | [`output`] | Progress, warning and info lines |
//! | [`config`] | Optional TOML settings (`IMAGEPREP_CONFIG`) |
//! | [`interrupt`] | Ctrl-C flag checked between tool invocations |
//!
//! # Working Copies
//!
//! Every file is first staged as an uncompressed TIFF next to its output
//! (`<output>.sipstmp`). All actions run against that copy, so a chain of
//! crops and scales never recompresses a lossy source more than once, and
//! the source is never touched until the final write.

pub mod actions;
pub mod args;
pub mod config;
pub mod imaging;
pub mod interrupt;
pub mod output;
pub mod paths;
pub mod process;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
