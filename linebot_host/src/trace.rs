//! Recorded sensor traces.
//!
//! A trace file carries one channel: one `timestamp value` pair per line,
//! `#` comments and blank lines ignored. Digital channels record the raw
//! electrical level (`0` or `1`, before active-low inversion), the light
//! channel a normalised brightness in `[0.0, 1.0]`. Timestamps use the
//! `HH:MM:SS:mmm` wall-clock form the recorder writes and must strictly
//! increase within a file.
//!
//! [`Schedule::merge`] folds per-channel traces into one time-ordered list
//! of batches, so every event that shares an instant is delivered to the
//! model in a single call.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use linebot_common::prelude::*;
use thiserror::Error;

// ─── Simulation Time ───────────────────────────────────────────────────────

/// Instant on the simulation clock, counted from the start of the run.
///
/// Parses from and displays as `HH:MM:SS:mmm` (the trailing millisecond
/// field may be omitted on input). Resolution is one millisecond.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(Duration);

impl SimTime {
    pub const ZERO: Self = Self(Duration::ZERO);

    #[inline]
    pub const fn new(offset: Duration) -> Self {
        Self(offset)
    }

    #[inline]
    pub const fn as_duration(self) -> Duration {
        self.0
    }

    /// Offset this instant forward, `None` on overflow.
    #[inline]
    pub fn checked_add(self, delay: Duration) -> Option<Self> {
        self.0.checked_add(delay).map(Self)
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    #[inline]
    pub fn duration_since(self, earlier: Self) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

fn parse_clock_field(field: &str, what: &str, source: &str) -> Result<u64, String> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid {what} in timestamp {source:?}"));
    }
    field
        .parse()
        .map_err(|_| format!("invalid {what} in timestamp {source:?}"))
}

impl FromStr for SimTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let (clock, millis_field) = match fields.as_slice() {
            [h, m, sec] => ([*h, *m, *sec], None),
            [h, m, sec, ms] => ([*h, *m, *sec], Some(*ms)),
            _ => {
                return Err(format!(
                    "invalid timestamp {s:?}: expected HH:MM:SS or HH:MM:SS:mmm"
                ));
            }
        };

        let hours = parse_clock_field(clock[0], "hours", s)?;
        let minutes = parse_clock_field(clock[1], "minutes", s)?;
        let seconds = parse_clock_field(clock[2], "seconds", s)?;
        if minutes > 59 {
            return Err(format!("minutes out of range in timestamp {s:?}"));
        }
        if seconds > 59 {
            return Err(format!("seconds out of range in timestamp {s:?}"));
        }
        let millis = match millis_field {
            Some(ms) if ms.len() == 3 => parse_clock_field(ms, "milliseconds", s)?,
            Some(_) => {
                return Err(format!(
                    "milliseconds must be exactly three digits in timestamp {s:?}"
                ));
            }
            None => 0,
        };

        let total_seconds = hours
            .checked_mul(3600)
            .and_then(|t| t.checked_add(minutes * 60 + seconds))
            .ok_or_else(|| format!("timestamp {s:?} overflows the clock"))?;
        Ok(Self(
            Duration::from_secs(total_seconds) + Duration::from_millis(millis),
        ))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = self.0.as_millis();
        let millis = total_ms % 1000;
        let seconds = (total_ms / 1000) % 60;
        let minutes = (total_ms / 60_000) % 60;
        let hours = total_ms / 3_600_000;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}:{millis:03}")
    }
}

// ─── Errors ────────────────────────────────────────────────────────────────

/// Why a trace file could not be turned into samples.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{}:{line}: timestamp {next} not after {prev}", path.display())]
    NonMonotonic {
        path: PathBuf,
        line: usize,
        prev: SimTime,
        next: SimTime,
    },
}

fn malformed(path: &Path, line: usize, reason: String) -> TraceError {
    TraceError::Malformed {
        path: path.to_path_buf(),
        line,
        reason,
    }
}

// ─── Trace Files ───────────────────────────────────────────────────────────

/// Samples recorded for one input channel, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFile {
    pub channel: InputChannel,
    pub samples: Vec<(SimTime, SensorEvent)>,
}

impl TraceFile {
    /// Read and parse the trace at `path`.
    pub fn load(channel: InputChannel, path: &Path) -> Result<Self, TraceError> {
        let content = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(channel, path, &content)
    }

    /// Parse trace text. `path` is only used in error messages.
    pub fn parse(channel: InputChannel, path: &Path, content: &str) -> Result<Self, TraceError> {
        let mut samples: Vec<(SimTime, SensorEvent)> = Vec::new();

        for (index, raw_line) in content.lines().enumerate() {
            let lineno = index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let [time_field, value_field] = fields.as_slice() else {
                return Err(malformed(
                    path,
                    lineno,
                    format!("expected `timestamp value`, got {} fields", fields.len()),
                ));
            };

            let time: SimTime = time_field
                .parse()
                .map_err(|reason| malformed(path, lineno, reason))?;
            if let Some(&(prev, _)) = samples.last() {
                if time <= prev {
                    return Err(TraceError::NonMonotonic {
                        path: path.to_path_buf(),
                        line: lineno,
                        prev,
                        next: time,
                    });
                }
            }

            let event = match channel {
                InputChannel::RightIr => {
                    SensorEvent::RightIr(parse_digital(path, lineno, value_field)?)
                }
                InputChannel::CenterIr => {
                    SensorEvent::CenterIr(parse_digital(path, lineno, value_field)?)
                }
                InputChannel::LeftIr => {
                    SensorEvent::LeftIr(parse_digital(path, lineno, value_field)?)
                }
                InputChannel::AmbientLight => {
                    SensorEvent::AmbientLight(parse_level(path, lineno, value_field)?)
                }
            };
            samples.push((time, event));
        }

        Ok(Self { channel, samples })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Raw electrical level of a digital sample, strictly `0` or `1`.
fn parse_digital(path: &Path, lineno: usize, field: &str) -> Result<bool, TraceError> {
    match field {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(malformed(
            path,
            lineno,
            format!("digital sample must be 0 or 1, got {other:?}"),
        )),
    }
}

/// Normalised brightness sample in `[0.0, 1.0]`.
fn parse_level(path: &Path, lineno: usize, field: &str) -> Result<f32, TraceError> {
    let level: f32 = field.parse().map_err(|_| {
        malformed(
            path,
            lineno,
            format!("light sample must be a number, got {field:?}"),
        )
    })?;
    if !(0.0..=1.0).contains(&level) {
        return Err(malformed(
            path,
            lineno,
            format!("light sample {level} outside [0.0, 1.0]"),
        ));
    }
    Ok(level)
}

// ─── Schedule ──────────────────────────────────────────────────────────────

/// Per-channel traces merged into time-ordered same-instant batches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    batches: Vec<(SimTime, Vec<SensorEvent>)>,
}

impl Schedule {
    /// Merge traces into batches. Events sharing an instant land in one
    /// batch, ordered by their trace's position in `traces`; callers pass
    /// traces in channel priority order so per-channel last-wins
    /// resolution inside the model stays deterministic.
    pub fn merge(traces: &[TraceFile]) -> Self {
        let mut flat: Vec<(SimTime, usize, SensorEvent)> = Vec::new();
        for (order, trace) in traces.iter().enumerate() {
            for &(time, event) in &trace.samples {
                flat.push((time, order, event));
            }
        }
        flat.sort_by_key(|&(time, order, _)| (time, order));

        let mut batches: Vec<(SimTime, Vec<SensorEvent>)> = Vec::new();
        for (time, _, event) in flat {
            match batches.last_mut() {
                Some((batch_time, events)) if *batch_time == time => events.push(event),
                _ => batches.push((time, vec![event])),
            }
        }
        Self { batches }
    }

    #[inline]
    pub fn batches(&self) -> &[(SimTime, Vec<SensorEvent>)] {
        &self.batches
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────
