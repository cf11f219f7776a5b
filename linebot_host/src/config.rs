//! Host configuration.
//!
//! One TOML file describes a replay: how long to run, how the controller
//! is set up, where the recorded traces live and where motor commands go.
//!
//! ```toml
//! [run]
//! until = "00:00:15:000"
//!
//! [controller]
//! steer = "cross"
//! polarity = "fast_side_reversed"
//!
//! [controller.light]
//! stop_below = 0.3
//!
//! [inputs]
//! right = "traces/right_ir.txt"
//! center = "traces/center_ir.txt"
//! left = "traces/left_ir.txt"
//! light = "traces/ambient_light.txt"
//!
//! [output]
//! path = "motors.log"
//! ```

use std::path::{Path, PathBuf};

use linebot_common::prelude::*;
use serde::Deserialize;

use crate::trace::SimTime;

// ─── Raw TOML Shape ────────────────────────────────────────────────────────

/// Host configuration as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub run: RunSection,
    #[serde(default)]
    pub controller: ControllerConfig,
    pub inputs: InputsSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Simulation cap in `HH:MM:SS:mmm` form, inclusive.
    #[serde(default = "default_until")]
    pub until: String,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            until: default_until(),
        }
    }
}

fn default_until() -> String {
    let cap = SimTime::new(DEFAULT_RUN_UNTIL);
    cap.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputsSection {
    pub right: PathBuf,
    pub center: PathBuf,
    pub left: PathBuf,
    /// Ambient light trace; only legal when `[controller.light]` is set.
    #[serde(default)]
    pub light: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    /// Motor log destination; stdout when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ─── Loaded Form ───────────────────────────────────────────────────────────

/// Validated host configuration, resolved into runtime types.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub controller: ControllerConfig,
    pub until: SimTime,
    /// Trace files in delivery order: IR channels first, then light.
    pub traces: Vec<(InputChannel, PathBuf)>,
    pub output: Option<PathBuf>,
}

/// Read, parse and validate the host configuration at `path`.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let raw = HostConfig::load(path)?;
    resolve(raw)
}

/// Parse and validate configuration text, for tests and tooling.
pub fn load_config_from_str(text: &str) -> Result<LoadedConfig, ConfigError> {
    let raw: HostConfig =
        toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    resolve(raw)
}

fn resolve(raw: HostConfig) -> Result<LoadedConfig, ConfigError> {
    raw.controller.validate()?;

    let until: SimTime = raw
        .run
        .until
        .parse()
        .map_err(|e| ConfigError::ValidationError(format!("run.until: {e}")))?;

    if raw.inputs.light.is_some() && raw.controller.light.is_none() {
        return Err(ConfigError::ValidationError(
            "inputs.light is set but [controller.light] is missing; \
             the light channel would be unwired"
                .to_string(),
        ));
    }

    let mut traces = vec![
        (InputChannel::RightIr, raw.inputs.right),
        (InputChannel::CenterIr, raw.inputs.center),
        (InputChannel::LeftIr, raw.inputs.left),
    ];
    if let Some(light) = raw.inputs.light {
        traces.push((InputChannel::AmbientLight, light));
    }

    Ok(LoadedConfig {
        controller: raw.controller,
        until,
        traces,
        output: raw.output.path,
    })
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[inputs]
right = "traces/right_ir.txt"
center = "traces/center_ir.txt"
left = "traces/left_ir.txt"
"#;

    #[test]
    fn minimal_config_fills_defaults() {
        let loaded = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(loaded.until, SimTime::new(DEFAULT_RUN_UNTIL));
        assert_eq!(loaded.controller, ControllerConfig::default());
        assert_eq!(loaded.traces.len(), 3);
        assert_eq!(loaded.traces[0].0, InputChannel::RightIr);
        assert_eq!(loaded.traces[2].0, InputChannel::LeftIr);
        assert!(loaded.output.is_none());
    }

    #[test]
    fn full_config_resolves_every_section() {
        let text = r#"
[run]
until = "00:00:15:000"

[controller]
steer = "direct"
polarity = "all_forward"

[controller.light]
stop_below = 0.25

[inputs]
right = "r.txt"
center = "c.txt"
left = "l.txt"
light = "a.txt"

[output]
path = "motors.log"
"#;
        let loaded = load_config_from_str(text).unwrap();
        assert_eq!(loaded.until.as_duration(), Duration::from_secs(15));
        assert_eq!(loaded.controller.steer, SteerConvention::Direct);
        assert_eq!(loaded.controller.polarity, PolarityConvention::AllForward);
        assert_eq!(loaded.controller.light.unwrap().stop_below, 0.25);
        assert_eq!(loaded.traces.len(), 4);
        assert_eq!(loaded.traces[3].0, InputChannel::AmbientLight);
        assert_eq!(loaded.output.as_deref(), Some(Path::new("motors.log")));
    }

    #[test]
    fn light_trace_without_light_config_is_rejected() {
        let text = r#"
[inputs]
right = "r.txt"
center = "c.txt"
left = "l.txt"
light = "a.txt"
"#;
        let err = load_config_from_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("unwired"));
    }

    #[test]
    fn bad_until_is_a_validation_error() {
        let text = r#"
[run]
until = "15 seconds"

[inputs]
right = "r.txt"
center = "c.txt"
left = "l.txt"
"#;
        let err = load_config_from_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("run.until"));
    }

    #[test]
    fn controller_validation_still_applies() {
        let text = r#"
[controller.light]
stop_below = 1.5

[inputs]
right = "r.txt"
center = "c.txt"
left = "l.txt"
"#;
        assert!(matches!(
            load_config_from_str(text),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_inputs_section_fails_parse() {
        assert!(matches!(
            load_config_from_str("[run]\nuntil = \"00:00:01:000\"\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn load_reads_a_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        file.flush().unwrap();

        let loaded = load_config(file.path()).unwrap();
        assert_eq!(loaded.traces.len(), 3);
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/linebot.toml")),
            Err(ConfigError::FileNotFound)
        ));
    }
}
