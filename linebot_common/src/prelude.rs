//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use linebot_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use linebot_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Channels ───────────────────────────────────────────────────────
pub use crate::channel::{ActiveLevel, InputChannel, SensorEvent};

// ─── Drive ──────────────────────────────────────────────────────────
pub use crate::drive::{CRUISE_DUTY, DriveCommand, MotorCommand, PIVOT_DUTY, WheelCommand};

// ─── Model Contract ─────────────────────────────────────────────────
pub use crate::model::{AtomicModel, ContractViolation, TimeAdvance};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, ControllerConfig, DEFAULT_STOP_BELOW, LightConfig,
    PolarityConvention, SteerConvention,
};

/// Default simulation cap used by the replay host.
pub const DEFAULT_RUN_UNTIL: Duration = Duration::from_secs(10 * 60);
