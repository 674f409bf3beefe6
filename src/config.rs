//! Persistent settings.
//!
//! Everything a single run needs comes from the command line. A small,
//! optional TOML file supplies the few values that tend to stay the same
//! between runs: where the external tool lives, and the initial pad colour
//! and JPEG quality.
//!
//! ## Location
//!
//! The file is read from the path in the `IMAGEPREP_CONFIG` environment
//! variable. When the variable is unset the stock defaults apply. When it
//! names a file that does not exist, that is a configuration error.
//!
//! ## Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tool]
//! path = "/usr/bin/sips"
//!
//! [defaults]
//! pad_colour = "FFFFFF"
//! jpeg_quality = 80
//! ```
//!
//! Files are sparse: user values are merged over the stock defaults. Unknown
//! keys are rejected to catch typos early.

use crate::args::process_colour;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "IMAGEPREP_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub tool: ToolSettings,
    pub defaults: DefaultsSettings,
}

/// The external raster tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub path: PathBuf,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/usr/bin/sips"),
        }
    }
}

/// Starting values that command-line flags override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsSettings {
    /// Pad colour used until the first `-c` flag.
    pub pad_colour: String,
    /// JPEG quality percentage used when `-j` is not given.
    pub jpeg_quality: f64,
}

impl Default for DefaultsSettings {
    fn default() -> Self {
        Self {
            pad_colour: "FFFFFF".to_string(),
            jpeg_quality: 80.0,
        }
    }
}

impl Settings {
    /// Validate values and normalize the pad colour.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.defaults.pad_colour = process_colour(&self.defaults.pad_colour)
            .map_err(|e| ConfigError::Validation(format!("defaults.pad_colour: {e}")))?;

        let q = self.defaults.jpeg_quality;
        if !(q > 0.0 && q <= 100.0) {
            return Err(ConfigError::Validation(
                "defaults.jpeg_quality must be in (0, 100]".into(),
            ));
        }

        if self.tool.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("tool.path must not be empty".into()));
        }
        Ok(self)
    }
}

// =============================================================================
// Loading and merging
// =============================================================================

/// The stock settings as a TOML table, the base layer for user overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Settings::default())
        .map_err(|e| ConfigError::Validation(format!("stock settings: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse settings text over the stock defaults.
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let settings: Settings = merged.try_into()?;
    settings.validate()
}

/// Load settings from a file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content)
}

/// Load settings from the file named by `IMAGEPREP_CONFIG`, if any.
pub fn load_from_env() -> Result<Settings, ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => {
            log::debug!("loading settings from {}", Path::new(&path).display());
            load_settings(Path::new(&path))
        }
        _ => Ok(Settings::default()),
    }
}

/// A fully commented stock settings file, printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# imageprep settings
# ==================
#
# Point the IMAGEPREP_CONFIG environment variable at this file.
# All options are optional. Defaults are shown.

[tool]
# External raster tool that performs the pixel work.
path = "/usr/bin/sips"

[defaults]
# Pad colour used until a -c/--colour flag is given.
# Accepts the same forms as -c: "#a1b2c3", "0xa1b2c3", "fff".
pad_colour = "FFFFFF"

# JPEG quality percentage used when -j/--jpeg is not given. Range (0, 100].
jpeg_quality = 80
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.tool.path, PathBuf::from("/usr/bin/sips"));
        assert_eq!(settings.defaults.pad_colour, "FFFFFF");
        assert_eq!(settings.defaults.jpeg_quality, 80.0);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = parse_settings(
            r#"
[defaults]
jpeg_quality = 65
"#,
        )
        .unwrap();
        assert_eq!(settings.defaults.jpeg_quality, 65.0);
        assert_eq!(settings.defaults.pad_colour, "FFFFFF");
        assert_eq!(settings.tool.path, PathBuf::from("/usr/bin/sips"));
    }

    #[test]
    fn pad_colour_is_normalized() {
        let settings = parse_settings(
            r##"
[defaults]
pad_colour = "#abc"
"##,
        )
        .unwrap();
        assert_eq!(settings.defaults.pad_colour, "000abc");
    }

    #[test]
    fn bad_pad_colour_is_rejected() {
        let err = parse_settings(
            r#"
[defaults]
pad_colour = "purple"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        for q in ["0", "101", "-5"] {
            let err = parse_settings(&format!("[defaults]\njpeg_quality = {q}\n")).unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)), "quality {q}");
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_settings(
            r#"
[tool]
binary = "/opt/sips"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn load_settings_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("imageprep.toml");
        fs::write(&path, "[tool]\npath = \"/opt/bin/sips\"\n").unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.tool.path, PathBuf::from("/opt/bin/sips"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_settings(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let settings = parse_settings(stock_config_toml()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn merge_overlay_wins_and_base_keys_survive() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }
}
