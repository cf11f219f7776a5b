//! Atomic-model contract.
//!
//! This module defines:
//! - `AtomicModel` trait - the event-driven model interface (transitions,
//!   output, time advance)
//! - `TimeAdvance` enum - time until the next autonomous event
//! - `ContractViolation` enum - host-misuse signals
//!
//! A model implementing `AtomicModel` is driven by a scheduler that owns
//! the clock: the model never polls, it only declares through
//! [`AtomicModel::time_advance`] when it next wants control.

use crate::channel::InputChannel;
use std::time::Duration;
use thiserror::Error;

// ─── ContractViolation ──────────────────────────────────────────────

/// Contract misuse signals.
///
/// These report scheduler or wiring bugs in the host, not sensor
/// conditions. A model returning one of these must leave its state exactly
/// as it was before the call, so the host can log and decide whether to
/// abort without the model drifting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// Internal or confluent transition invoked while the model is passive.
    #[error("internal transition while passive (no output scheduled)")]
    SpuriousInternal,

    /// Event delivered on a channel the model was not configured to accept.
    #[error("event on unwired channel '{channel}'")]
    UnwiredChannel { channel: InputChannel },
}

// ─── TimeAdvance ────────────────────────────────────────────────────

/// Time until the model's next autonomous (internal) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeAdvance {
    /// Internal event due after this delay.
    After(Duration),
    /// Passive: no internal event scheduled.
    Never,
}

impl TimeAdvance {
    /// Internal event due immediately (zero delay).
    pub const IMMEDIATE: Self = Self::After(Duration::ZERO);

    /// Returns true when no internal event is scheduled.
    #[inline]
    pub const fn is_passive(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// The scheduled delay, or `None` when passive.
    #[inline]
    pub const fn delay(&self) -> Option<Duration> {
        match self {
            Self::After(d) => Some(*d),
            Self::Never => None,
        }
    }
}

// ─── AtomicModel ────────────────────────────────────────────────────

/// Interface for event-driven atomic models.
///
/// The scheduler drives a model through exactly these calls:
///
/// | Operation | When the scheduler calls it | Mutates |
/// |-----------|-----------------------------|---------|
/// | `external_transition()` | input batch arrives before the advance expires | yes |
/// | `output()` | immediately before each internal/confluent transition | no |
/// | `internal_transition()` | the advance expires with no input | yes |
/// | `confluent_transition()` | input batch arrives exactly at expiry | yes |
/// | `time_advance()` | after every transition | no |
///
/// `output()` and `time_advance()` are pure observations and legal at any
/// time; repeated calls between transitions return the same value.
///
/// All events within one batch share a single simulation instant. Batching
/// is the scheduler's job; the model sees the whole instant at once.
pub trait AtomicModel {
    /// Event type delivered in input batches.
    type Input;
    /// Value produced by [`AtomicModel::output`].
    type Output;

    /// React to a batch of same-instant input events.
    ///
    /// `elapsed` is the time since the previous transition (strictly less
    /// than the pending advance). An empty batch is legal and must leave
    /// the model unchanged.
    fn external_transition(
        &mut self,
        elapsed: Duration,
        events: &[Self::Input],
    ) -> Result<(), ContractViolation>;

    /// Autonomous step taken when the advance expires.
    ///
    /// # Errors
    /// `ContractViolation::SpuriousInternal` when called while passive.
    fn internal_transition(&mut self) -> Result<(), ContractViolation>;

    /// Tie-break when an input batch lands exactly when the advance expires.
    ///
    /// Default: internal first, then external with zero elapsed time, so
    /// the scheduled output is resolved before fresh sensor data is
    /// absorbed.
    fn confluent_transition(&mut self, events: &[Self::Input]) -> Result<(), ContractViolation> {
        self.internal_transition()?;
        self.external_transition(Duration::ZERO, events)
    }

    /// Observe the pending output value.
    fn output(&self) -> Self::Output;

    /// Time until the next internal event.
    fn time_advance(&self) -> TimeAdvance;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal model that records the order of its transitions.
    struct ProbeModel {
        pending: bool,
        trace: Vec<String>,
    }

    impl ProbeModel {
        fn new() -> Self {
            Self {
                pending: false,
                trace: Vec::new(),
            }
        }
    }

    impl AtomicModel for ProbeModel {
        type Input = u8;
        type Output = usize;

        fn external_transition(
            &mut self,
            elapsed: Duration,
            events: &[u8],
        ) -> Result<(), ContractViolation> {
            self.trace
                .push(format!("ext({:?}, n={})", elapsed, events.len()));
            if !events.is_empty() {
                self.pending = true;
            }
            Ok(())
        }

        fn internal_transition(&mut self) -> Result<(), ContractViolation> {
            if !self.pending {
                return Err(ContractViolation::SpuriousInternal);
            }
            self.trace.push("int".to_string());
            self.pending = false;
            Ok(())
        }

        fn output(&self) -> usize {
            self.trace.len()
        }

        fn time_advance(&self) -> TimeAdvance {
            if self.pending {
                TimeAdvance::IMMEDIATE
            } else {
                TimeAdvance::Never
            }
        }
    }

    #[test]
    fn immediate_is_zero_delay() {
        assert_eq!(TimeAdvance::IMMEDIATE, TimeAdvance::After(Duration::ZERO));
        assert_eq!(TimeAdvance::IMMEDIATE.delay(), Some(Duration::ZERO));
        assert!(!TimeAdvance::IMMEDIATE.is_passive());
    }

    #[test]
    fn never_is_passive() {
        assert!(TimeAdvance::Never.is_passive());
        assert_eq!(TimeAdvance::Never.delay(), None);
    }

    #[test]
    fn default_confluent_runs_internal_then_external() {
        let mut model = ProbeModel::new();
        model
            .external_transition(Duration::from_millis(5), &[1])
            .unwrap();
        assert_eq!(model.time_advance(), TimeAdvance::IMMEDIATE);

        // Batch arrives exactly at expiry.
        model.confluent_transition(&[2]).unwrap();
        assert_eq!(
            model.trace,
            vec!["ext(5ms, n=1)", "int", "ext(0ns, n=1)"],
            "confluent must resolve the scheduled output before the new batch"
        );
        // The confluent's external half re-armed the model.
        assert_eq!(model.time_advance(), TimeAdvance::IMMEDIATE);
    }

    #[test]
    fn default_confluent_propagates_spurious_internal() {
        let mut model = ProbeModel::new();
        let err = model.confluent_transition(&[1]).unwrap_err();
        assert_eq!(err, ContractViolation::SpuriousInternal);
        // The external half must not have run.
        assert!(model.trace.is_empty());
    }

    #[test]
    fn violation_display() {
        let err = ContractViolation::UnwiredChannel {
            channel: InputChannel::AmbientLight,
        };
        assert!(err.to_string().contains("ambient_light"));
        assert!(
            ContractViolation::SpuriousInternal
                .to_string()
                .contains("passive")
        );
    }
}
