//! Single-model replay loop.
//!
//! The runner owns the simulation clock. Each iteration it compares the
//! model's declared time advance against the next recorded input batch and
//! fires exactly one transition:
//!
//! - internal event strictly earlier: `output()` is emitted through the
//!   sink, then `internal_transition()`
//! - input batch strictly earlier: `external_transition()` with the time
//!   elapsed since the previous transition
//! - same instant: `output()` is emitted, then `confluent_transition()`
//!
//! The run stops once every remaining event falls past the cap; nothing
//! past the cap is drained.

use std::io;

use linebot_common::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::sink::OutputSink;
use crate::trace::{Schedule, SimTime};

// ─── Errors ────────────────────────────────────────────────────────────────

/// Why a replay aborted.
#[derive(Debug, Error)]
pub enum RunError {
    /// The model rejected a transition. This is a scheduler or wiring bug,
    /// so the run stops rather than silently dropping the step.
    #[error("model contract violated at {time}: {source}")]
    Contract {
        time: SimTime,
        #[source]
        source: ContractViolation,
    },

    /// The sink could not accept an emitted command.
    #[error("output sink failed at {time}: {source}")]
    Sink {
        time: SimTime,
        #[source]
        source: io::Error,
    },
}

// ─── Statistics ────────────────────────────────────────────────────────────

/// Counters reported after a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Input batches delivered (external and confluent transitions).
    pub batches: u64,
    /// Commands emitted (internal and confluent transitions).
    pub outputs: u64,
    /// Instant of the last executed transition, zero if none ran.
    pub finished_at: SimTime,
}

// ─── Replay Loop ───────────────────────────────────────────────────────────

/// Replay `schedule` against `model` until every remaining event falls
/// past `until` (the cap itself is inclusive).
pub fn run<M, S>(
    model: &mut M,
    schedule: &Schedule,
    until: SimTime,
    sink: &mut S,
) -> Result<RunStats, RunError>
where
    M: AtomicModel<Input = SensorEvent>,
    S: OutputSink<M::Output>,
{
    let mut stats = RunStats::default();
    let mut last_transition = SimTime::ZERO;
    let mut next_batch = 0usize;

    info!(
        "Replay starting: {} batches scheduled, cap {}",
        schedule.len(),
        until
    );

    loop {
        // An advance that overflows the clock can never fire.
        let next_internal = model
            .time_advance()
            .delay()
            .and_then(|delay| last_transition.checked_add(delay));
        let next_external = schedule.batches().get(next_batch).map(|(time, _)| *time);

        let (now, internal_due, external_due) = match (next_internal, next_external) {
            (None, None) => break,
            (Some(internal), None) => (internal, true, false),
            (None, Some(external)) => (external, false, true),
            (Some(internal), Some(external)) => {
                if internal < external {
                    (internal, true, false)
                } else if external < internal {
                    (external, false, true)
                } else {
                    (internal, true, true)
                }
            }
        };
        if now > until {
            break;
        }

        // The output precedes the transition that consumes it.
        if internal_due {
            let output = model.output();
            sink.emit(now, &output)
                .map_err(|source| RunError::Sink { time: now, source })?;
            stats.outputs += 1;
        }

        let step = if internal_due && external_due {
            let (_, events) = &schedule.batches()[next_batch];
            debug!("Confluent transition at {now}, {} events", events.len());
            next_batch += 1;
            stats.batches += 1;
            model.confluent_transition(events)
        } else if internal_due {
            debug!("Internal transition at {now}");
            model.internal_transition()
        } else {
            let (_, events) = &schedule.batches()[next_batch];
            debug!("External transition at {now}, {} events", events.len());
            next_batch += 1;
            stats.batches += 1;
            model.external_transition(now.duration_since(last_transition), events)
        };
        step.map_err(|source| RunError::Contract { time: now, source })?;

        last_transition = now;
        stats.finished_at = now;
    }

    info!(
        "Replay complete: {} batches in, {} commands out, finished at {}",
        stats.batches, stats.outputs, stats.finished_at
    );
    Ok(stats)
}

// ─── Tests ─────────────────────────────────────────────────────────────────
