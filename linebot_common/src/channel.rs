//! Input channel types.
//!
//! `InputChannel` names the four sensor ports of the robot and maps to the
//! snake_case identifiers used in trace files and config. `SensorEvent`
//! carries the raw sample together with its channel so that a payload can
//! never arrive with the wrong type. `ActiveLevel` captures the electrical
//! convention of the IR array (the Grove sensors pull low over the line).

use core::fmt;
use serde::{Deserialize, Serialize};

// ─── InputChannel ───────────────────────────────────────────────────

/// Sensor input channel discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputChannel {
    RightIr,
    CenterIr,
    LeftIr,
    AmbientLight,
}

impl fmt::Display for InputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RightIr => write!(f, "right_ir"),
            Self::CenterIr => write!(f, "center_ir"),
            Self::LeftIr => write!(f, "left_ir"),
            Self::AmbientLight => write!(f, "ambient_light"),
        }
    }
}

// ─── ActiveLevel ────────────────────────────────────────────────────

/// Digital reading interpretation.
///
/// The IR line sensors are active-low: a raw `false` sample means the
/// sensor is over the line. De-inversion happens once, at the point a raw
/// sample enters the controller, so everything downstream speaks in terms
/// of "line detected".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveLevel {
    /// Asserted when the raw sample reads low.
    #[serde(rename = "low")]
    ActiveLow,
    /// Asserted when the raw sample reads high.
    #[serde(rename = "high")]
    ActiveHigh,
}

impl ActiveLevel {
    /// Interpret a raw digital sample under this convention.
    #[inline]
    pub const fn is_asserted(self, raw: bool) -> bool {
        match self {
            Self::ActiveLow => !raw,
            Self::ActiveHigh => raw,
        }
    }
}

impl Default for ActiveLevel {
    fn default() -> Self {
        Self::ActiveLow
    }
}

// ─── SensorEvent ────────────────────────────────────────────────────

/// One member of an input batch: a raw sample on a named channel.
///
/// Digital payloads are raw (pre-inversion) samples as read from the pin.
/// The ambient level is normalized to `[0.0, 1.0]` where 0.0 is dark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorEvent {
    RightIr(bool),
    CenterIr(bool),
    LeftIr(bool),
    AmbientLight(f32),
}

impl SensorEvent {
    /// The channel this event arrived on.
    #[inline]
    pub const fn channel(&self) -> InputChannel {
        match self {
            Self::RightIr(_) => InputChannel::RightIr,
            Self::CenterIr(_) => InputChannel::CenterIr,
            Self::LeftIr(_) => InputChannel::LeftIr,
            Self::AmbientLight(_) => InputChannel::AmbientLight,
        }
    }
}
