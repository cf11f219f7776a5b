//! Drive-decision and output-magnitude tables.
//!
//! Both steps of the sensor-to-motor mapping are plain const lookup tables:
//! `DecisionTable` maps a 3-bit line-detection pattern to a drive command,
//! `DriveTable` maps a drive command to per-wheel duty/polarity pairs.
//! The two firmware revisions of the robot disagreed on the steering sign
//! and on the motor polarity wiring; each revision survives as a named
//! preset, selected through [`SteerConvention`] and [`PolarityConvention`].

use bitflags::bitflags;
use linebot_common::config::{PolarityConvention, SteerConvention};
use linebot_common::drive::{CRUISE_DUTY, DriveCommand, MotorCommand, PIVOT_DUTY, WheelCommand};

// ─── SensorPattern ──────────────────────────────────────────────────

bitflags! {
    /// Line-detection pattern across the three IR sensors.
    ///
    /// A set bit means the sensor currently sees the line (after
    /// active-low de-inversion at the controller boundary).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SensorPattern: u8 {
        const RIGHT  = 0b001;
        const CENTER = 0b010;
        const LEFT   = 0b100;
    }
}

impl SensorPattern {
    /// Number of distinct patterns, for table sizing.
    pub const COUNT: usize = 8;
}

impl Default for SensorPattern {
    fn default() -> Self {
        Self::empty()
    }
}

// ─── DecisionTable ──────────────────────────────────────────────────

/// Sensor pattern → drive command lookup, indexed by `SensorPattern::bits()`.
///
/// Common rows across both presets: center-involved patterns and the
/// left+right split pattern drive `Straight`; no line anywhere and all
/// three sensors lit (a crossing marker) both `Stop`. The presets differ
/// only in the two lone-edge rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionTable {
    commands: [DriveCommand; SensorPattern::COUNT],
}

impl DecisionTable {
    /// Cross-steer revision: a lone edge hit swings back across the line
    /// (right sensor → turn left, left sensor → turn right).
    pub const CROSS: Self = Self {
        commands: [
            DriveCommand::Stop,     // 0b000: line lost
            DriveCommand::Left,     // 0b001: right sensor only
            DriveCommand::Straight, // 0b010: center only
            DriveCommand::Straight, // 0b011: center + right
            DriveCommand::Right,    // 0b100: left sensor only
            DriveCommand::Straight, // 0b101: left + right
            DriveCommand::Straight, // 0b110: left + center
            DriveCommand::Stop,     // 0b111: crossing marker
        ],
    };

    /// Direct-steer revision: a lone edge hit turns toward that edge.
    pub const DIRECT: Self = Self {
        commands: [
            DriveCommand::Stop,
            DriveCommand::Right, // 0b001: right sensor only
            DriveCommand::Straight,
            DriveCommand::Straight,
            DriveCommand::Left, // 0b100: left sensor only
            DriveCommand::Straight,
            DriveCommand::Straight,
            DriveCommand::Stop,
        ],
    };

    /// Look up the drive command for a pattern.
    #[inline]
    pub const fn decide(&self, pattern: SensorPattern) -> DriveCommand {
        self.commands[pattern.bits() as usize]
    }
}

impl From<SteerConvention> for DecisionTable {
    fn from(convention: SteerConvention) -> Self {
        match convention {
            SteerConvention::Cross => Self::CROSS,
            SteerConvention::Direct => Self::DIRECT,
        }
    }
}

// ─── DriveTable ─────────────────────────────────────────────────────

/// Drive command → motor command lookup, indexed by `DriveCommand as u8`.
///
/// A pivot turn runs the outer wheel at full duty and the inner wheel at
/// cruise duty; `Straight` cruises both wheels; `Stop` releases both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveTable {
    wheels: [MotorCommand; DriveCommand::COUNT],
}

impl DriveTable {
    /// Pivot-turn wiring of the original chassis: the full-duty wheel also
    /// gets its direction pin set.
    pub const FAST_SIDE_REVERSED: Self = Self {
        wheels: [
            // Right: inner (right) wheel cruises, outer (left) wheel pivots.
            MotorCommand::new(
                WheelCommand::new(CRUISE_DUTY, false),
                WheelCommand::new(PIVOT_DUTY, true),
            ),
            // Straight: both wheels cruise.
            MotorCommand::new(
                WheelCommand::new(CRUISE_DUTY, false),
                WheelCommand::new(CRUISE_DUTY, false),
            ),
            // Left: outer (right) wheel pivots, inner (left) wheel cruises.
            MotorCommand::new(
                WheelCommand::new(PIVOT_DUTY, true),
                WheelCommand::new(CRUISE_DUTY, false),
            ),
            // Stop: both wheels released.
            MotorCommand::STOP,
        ],
    };

    /// Forward-only wiring: direction pins stay released, only duty varies.
    pub const ALL_FORWARD: Self = Self {
        wheels: [
            MotorCommand::new(
                WheelCommand::new(CRUISE_DUTY, false),
                WheelCommand::new(PIVOT_DUTY, false),
            ),
            MotorCommand::new(
                WheelCommand::new(CRUISE_DUTY, false),
                WheelCommand::new(CRUISE_DUTY, false),
            ),
            MotorCommand::new(
                WheelCommand::new(PIVOT_DUTY, false),
                WheelCommand::new(CRUISE_DUTY, false),
            ),
            MotorCommand::STOP,
        ],
    };

    /// Look up the motor command for a drive command.
    #[inline]
    pub const fn command_for(&self, drive: DriveCommand) -> MotorCommand {
        self.wheels[drive as usize]
    }
}

impl From<PolarityConvention> for DriveTable {
    fn from(convention: PolarityConvention) -> Self {
        match convention {
            PolarityConvention::FastSideReversed => Self::FAST_SIDE_REVERSED,
            PolarityConvention::AllForward => Self::ALL_FORWARD,
        }
    }
}
