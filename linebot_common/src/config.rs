//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across the linebot applications, plus the controller's own configuration
//! (steering and polarity conventions, optional ambient-light guard).
//!
//! # Usage
//!
//! ```rust,no_run
//! use linebot_common::config::{ConfigError, ConfigLoader, ControllerConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = ControllerConfig::load(Path::new("controller.toml"))?;
//!     config.validate()?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ─── Error Type ─────────────────────────────────────────────────────

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

// ─── Loader Trait ───────────────────────────────────────────────────

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
/// - Semantic validation is the caller's job via `validate()`
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Controller Conventions ─────────────────────────────────────────

/// Steering sign convention for the single-sensor rows of the decision
/// table.
///
/// The two firmware revisions of the robot disagreed on which way to turn
/// when exactly one edge sensor sees the line. Both survive as named
/// presets so a trace recorded against either revision replays correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SteerConvention {
    /// Right sensor hit steers `Left`, left sensor hit steers `Right`
    /// (swing back across the line).
    #[default]
    Cross,
    /// Right sensor hit steers `Right`, left sensor hit steers `Left`.
    Direct,
}

/// Motor polarity convention for the output magnitude table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolarityConvention {
    /// The full-speed wheel also gets its direction pin set, the
    /// half-speed wheel runs forward. Matches the pivot-turn wiring of
    /// the original chassis.
    #[default]
    FastSideReversed,
    /// Direction pins stay released; only duty varies.
    AllForward,
}

// ─── Light Guard ────────────────────────────────────────────────────

/// Default ambient-light stop threshold (normalized).
pub const DEFAULT_STOP_BELOW: f32 = 0.3;

/// Ambient-light guard configuration.
///
/// When present, the controller forces `Stop` whenever the most recent
/// ambient sample is below `stop_below`. When absent, the ambient-light
/// channel is unwired and events on it are a contract violation.
///
/// # TOML Example
///
/// ```toml
/// [controller.light]
/// stop_below = 0.3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    /// Normalized threshold in `[0.0, 1.0]`; darker than this stops the
    /// robot.
    #[serde(default = "default_stop_below")]
    pub stop_below: f32,
}

fn default_stop_below() -> f32 {
    DEFAULT_STOP_BELOW
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            stop_below: default_stop_below(),
        }
    }
}

impl LightConfig {
    /// Validate the threshold range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.stop_below) || self.stop_below.is_nan() {
            return Err(ConfigError::ValidationError(format!(
                "light.stop_below {} out of range [0.0, 1.0]",
                self.stop_below
            )));
        }
        Ok(())
    }
}

// ─── Controller Config ──────────────────────────────────────────────

/// Controller configuration: table presets plus the optional light guard.
///
/// # TOML Example
///
/// ```toml
/// [controller]
/// steer = "cross"
/// polarity = "fast_side_reversed"
///
/// [controller.light]
/// stop_below = 0.3
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Decision table preset.
    #[serde(default)]
    pub steer: SteerConvention,

    /// Output magnitude preset.
    #[serde(default)]
    pub polarity: PolarityConvention,

    /// Ambient-light guard; `None` leaves the light channel unwired.
    #[serde(default)]
    pub light: Option<LightConfig>,
}

impl ControllerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the light threshold is
    /// outside `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(light) = &self.light {
            light.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_original_chassis() {
        let config = ControllerConfig::default();
        assert_eq!(config.steer, SteerConvention::Cross);
        assert_eq!(config.polarity, PolarityConvention::FastSideReversed);
        assert!(config.light.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn convention_deserialization() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            steer: SteerConvention,
            polarity: PolarityConvention,
        }

        let w: Wrapper = toml::from_str("steer = \"direct\"\npolarity = \"all_forward\"").unwrap();
        assert_eq!(w.steer, SteerConvention::Direct);
        assert_eq!(w.polarity, PolarityConvention::AllForward);

        assert!(toml::from_str::<Wrapper>("steer = \"sideways\"\npolarity = \"all_forward\"").is_err());
    }

    #[test]
    fn light_threshold_default() {
        let light: LightConfig = toml::from_str("").unwrap();
        assert_eq!(light.stop_below, 0.3);
        assert!(light.validate().is_ok());
    }

    #[test]
    fn light_threshold_range_validation() {
        let too_dark = LightConfig { stop_below: -0.1 };
        assert!(matches!(
            too_dark.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let too_bright = LightConfig { stop_below: 1.5 };
        assert!(too_bright.validate().is_err());

        let nan = LightConfig {
            stop_below: f32::NAN,
        };
        assert!(nan.validate().is_err());

        let edge = LightConfig { stop_below: 1.0 };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn controller_config_validates_light_section() {
        let config = ControllerConfig {
            light: Some(LightConfig { stop_below: 2.0 }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn config_loader_file_not_found() {
        let result = ControllerConfig::load(Path::new("/nonexistent/path/controller.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn config_loader_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = ControllerConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn config_loader_success() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"steer = "direct"
polarity = "all_forward"

[light]
stop_below = 0.25
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = ControllerConfig::load(file.path()).unwrap();
        assert_eq!(config.steer, SteerConvention::Direct);
        assert_eq!(config.polarity, PolarityConvention::AllForward);
        assert_eq!(config.light.unwrap().stop_below, 0.25);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: ControllerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }
}
