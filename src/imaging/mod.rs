//! Everything that touches image files or the external tool.
//!
//! | Concern | Where |
//! |---|---|
//! | **Probe** | `image` crate header decoder + [`density`] header scan |
//! | **Geometry** | [`geometry`], pure dimension and anchor math |
//! | **Tool calls** | [`params`] records rendered to argument vectors |
//! | **Execution** | [`RasterTool`] trait + [`SipsTool`] subprocess runner |
//!
//! [`operations`] combines geometry with parameters into a per-file plan.

pub mod density;
pub mod geometry;
pub mod operations;
pub mod params;
pub mod probe;
pub mod sips;
pub mod tool;

pub use params::Quality;
pub use probe::{ImageInfo, ProbeError, probe};
pub use sips::SipsTool;
pub use tool::{RasterTool, ToolError};
