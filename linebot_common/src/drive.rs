//! Drive command and motor actuation types.
//!
//! `DriveCommand` is the controller's phase variable; the numeric values
//! match the firmware's wire encoding (right=0, straight=1, left=2, stop=3).
//! `MotorCommand` is what the controller emits: one duty/polarity pair per
//! wheel, ready for a PWM + direction-pin backend.

use serde::{Deserialize, Serialize};

/// Cruise PWM duty applied to a wheel that is not pivoting.
pub const CRUISE_DUTY: f32 = 0.5;

/// Full PWM duty applied to the outer wheel of a pivot turn.
pub const PIVOT_DUTY: f32 = 1.0;

// ─── DriveCommand ───────────────────────────────────────────────────

/// Steering command derived from the sensor pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DriveCommand {
    /// Pivot toward the right wheel side.
    Right = 0,
    /// Both wheels at cruise duty.
    Straight = 1,
    /// Pivot toward the left wheel side.
    Left = 2,
    /// Both wheels off.
    Stop = 3,
}

impl DriveCommand {
    /// Number of drive commands, for table sizing.
    pub const COUNT: usize = 4;

    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Right),
            1 => Some(Self::Straight),
            2 => Some(Self::Left),
            3 => Some(Self::Stop),
            _ => None,
        }
    }
}

impl Default for DriveCommand {
    fn default() -> Self {
        Self::Straight
    }
}

// ─── Motor Commands ─────────────────────────────────────────────────

/// Actuation pair for one wheel: PWM duty plus direction polarity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelCommand {
    /// PWM duty cycle in `[0.0, 1.0]`.
    pub duty: f32,
    /// Direction pin level.
    pub polarity: bool,
}

impl WheelCommand {
    /// Wheel at rest: zero duty, polarity released.
    pub const OFF: Self = Self {
        duty: 0.0,
        polarity: false,
    };

    #[inline]
    pub const fn new(duty: f32, polarity: bool) -> Self {
        Self { duty, polarity }
    }
}

/// Complete motor command: both wheels of the differential drive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotorCommand {
    pub right: WheelCommand,
    pub left: WheelCommand,
}

impl MotorCommand {
    /// Both wheels off.
    pub const STOP: Self = Self {
        right: WheelCommand::OFF,
        left: WheelCommand::OFF,
    };

    #[inline]
    pub const fn new(right: WheelCommand, left: WheelCommand) -> Self {
        Self { right, left }
    }
}
