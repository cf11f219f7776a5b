//! The line-following atomic controller.
//!
//! `LineBotController` ties the decision and output tables to the
//! [`AtomicModel`] transition contract. The external transition absorbs a
//! batch of same-instant sensor events and schedules exactly one output;
//! the paired internal transition emits it. Between the two, the model
//! advertises a zero time advance so the scheduler comes straight back.

use linebot_common::channel::{ActiveLevel, InputChannel, SensorEvent};
use linebot_common::config::{ControllerConfig, LightConfig};
use linebot_common::drive::{DriveCommand, MotorCommand};
use linebot_common::model::{AtomicModel, ContractViolation, TimeAdvance};
use std::time::Duration;
use tracing::trace;

use crate::decision::{DecisionTable, DriveTable, SensorPattern};

// ─── ControllerState ────────────────────────────────────────────────

/// Complete controller state, observable between transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    /// Line-detection pattern after de-inversion.
    pub pattern: SensorPattern,
    /// Drive command selected by the last accepted batch.
    pub drive: DriveCommand,
    /// True while an output is scheduled and not yet emitted.
    pub output_pending: bool,
    /// Most recent ambient-light sample, sticky across batches.
    pub ambient: f32,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            pattern: SensorPattern::empty(),
            drive: DriveCommand::Straight,
            output_pending: false,
            // Bright until a sample says otherwise, so the guard only
            // engages once the light sensor has actually reported dark.
            ambient: 1.0,
        }
    }
}

// ─── LineBotController ──────────────────────────────────────────────

/// Sensor-driven line-following controller.
///
/// Implements [`AtomicModel`] over typed [`SensorEvent`]s. Within one
/// batch the last event per channel wins; raw IR samples are de-inverted
/// here, at the boundary, so the tables only ever see "line detected"
/// bits. When the ambient-light guard is configured, a dark sample
/// overrides the table's command with `Stop` until a bright sample
/// arrives; the guard never edits the table itself.
#[derive(Debug, Clone)]
pub struct LineBotController {
    state: ControllerState,
    decision: DecisionTable,
    output_map: DriveTable,
    light: Option<LightConfig>,
}

impl LineBotController {
    /// Electrical convention of the IR array: the line pulls the pin low.
    const IR_LEVEL: ActiveLevel = ActiveLevel::ActiveLow;

    /// Create a controller from a validated configuration.
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            state: ControllerState::default(),
            decision: DecisionTable::from(config.steer),
            output_map: DriveTable::from(config.polarity),
            light: config.light,
        }
    }

    /// Current state snapshot.
    #[inline]
    pub const fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Returns true when the ambient-light channel is wired.
    #[inline]
    pub const fn light_enabled(&self) -> bool {
        self.light.is_some()
    }

    /// Check a batch for events on channels the controller is not wired
    /// to accept.
    fn check_wired(&self, events: &[SensorEvent]) -> Result<(), ContractViolation> {
        let unwired_light = self.light.is_none()
            && events
                .iter()
                .any(|e| e.channel() == InputChannel::AmbientLight);
        if unwired_light {
            return Err(ContractViolation::UnwiredChannel {
                channel: InputChannel::AmbientLight,
            });
        }
        Ok(())
    }

    fn apply_event(&mut self, event: &SensorEvent) {
        match *event {
            SensorEvent::RightIr(raw) => self
                .state
                .pattern
                .set(SensorPattern::RIGHT, Self::IR_LEVEL.is_asserted(raw)),
            SensorEvent::CenterIr(raw) => self
                .state
                .pattern
                .set(SensorPattern::CENTER, Self::IR_LEVEL.is_asserted(raw)),
            SensorEvent::LeftIr(raw) => self
                .state
                .pattern
                .set(SensorPattern::LEFT, Self::IR_LEVEL.is_asserted(raw)),
            SensorEvent::AmbientLight(level) => self.state.ambient = level,
        }
    }

    /// Table decision with the light guard applied on top.
    fn decide(&self) -> DriveCommand {
        match self.light {
            Some(light) if self.state.ambient < light.stop_below => DriveCommand::Stop,
            _ => self.decision.decide(self.state.pattern),
        }
    }
}

impl AtomicModel for LineBotController {
    type Input = SensorEvent;
    type Output = MotorCommand;

    fn external_transition(
        &mut self,
        elapsed: Duration,
        events: &[SensorEvent],
    ) -> Result<(), ContractViolation> {
        // Reject unwired channels before mutating anything, so a failed
        // call leaves the state exactly as it was.
        self.check_wired(events)?;

        if events.is_empty() {
            return Ok(());
        }

        for event in events {
            self.apply_event(event);
        }
        self.state.drive = self.decide();
        self.state.output_pending = true;

        trace!(
            "External transition after {:?}: pattern={:?}, drive={:?}",
            elapsed, self.state.pattern, self.state.drive
        );
        Ok(())
    }

    fn internal_transition(&mut self) -> Result<(), ContractViolation> {
        if !self.state.output_pending {
            return Err(ContractViolation::SpuriousInternal);
        }
        // Only the pending flag clears; the drive command stays observable.
        self.state.output_pending = false;
        trace!("Internal transition: emitted {:?}", self.state.drive);
        Ok(())
    }

    fn confluent_transition(&mut self, events: &[SensorEvent]) -> Result<(), ContractViolation> {
        // Validated up front: the internal half would otherwise clear the
        // pending flag before the external half rejects the batch.
        self.check_wired(events)?;
        self.internal_transition()?;
        self.external_transition(Duration::ZERO, events)
    }

    fn output(&self) -> MotorCommand {
        self.output_map.command_for(self.state.drive)
    }

    fn time_advance(&self) -> TimeAdvance {
        if self.state.output_pending {
            TimeAdvance::IMMEDIATE
        } else {
            TimeAdvance::Never
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linebot_common::config::{PolarityConvention, SteerConvention};

    fn controller() -> LineBotController {
        LineBotController::new(&ControllerConfig::default())
    }

    fn controller_with_light(stop_below: f32) -> LineBotController {
        LineBotController::new(&ControllerConfig {
            steer: SteerConvention::Cross,
            polarity: PolarityConvention::FastSideReversed,
            light: Some(LightConfig { stop_below }),
        })
    }

    #[test]
    fn initial_state_is_passive_straight() {
        let c = controller();
        assert_eq!(c.state().pattern, SensorPattern::empty());
        assert_eq!(c.state().drive, DriveCommand::Straight);
        assert!(!c.state().output_pending);
        assert_eq!(c.state().ambient, 1.0);
        assert!(c.time_advance().is_passive());
    }

    #[test]
    fn external_schedules_immediate_output() {
        let mut c = controller();
        // Raw low = center sensor over the line.
        c.external_transition(Duration::ZERO, &[SensorEvent::CenterIr(false)])
            .unwrap();

        assert!(c.state().output_pending);
        assert_eq!(c.state().drive, DriveCommand::Straight);
        assert_eq!(c.time_advance(), TimeAdvance::IMMEDIATE);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut c = controller();
        let before = *c.state();

        c.external_transition(Duration::from_millis(100), &[]).unwrap();

        assert_eq!(*c.state(), before);
        assert_eq!(c.time_advance(), TimeAdvance::Never);
    }

    #[test]
    fn raw_samples_are_deinverted() {
        let mut c = controller();
        c.external_transition(
            Duration::ZERO,
            &[
                SensorEvent::RightIr(false), // low = detected
                SensorEvent::CenterIr(true), // high = clear
                SensorEvent::LeftIr(true),
            ],
        )
        .unwrap();

        assert_eq!(c.state().pattern, SensorPattern::RIGHT);
        assert_eq!(c.state().drive, DriveCommand::Left);
    }

    #[test]
    fn last_event_per_channel_wins() {
        let mut c = controller();
        c.external_transition(
            Duration::ZERO,
            &[
                SensorEvent::CenterIr(false),
                SensorEvent::CenterIr(true), // retracts the first sample
                SensorEvent::RightIr(false),
            ],
        )
        .unwrap();

        assert_eq!(c.state().pattern, SensorPattern::RIGHT);
        assert_eq!(c.state().drive, DriveCommand::Left);
    }

    #[test]
    fn pattern_bits_persist_across_batches() {
        let mut c = controller();
        c.external_transition(Duration::ZERO, &[SensorEvent::CenterIr(false)])
            .unwrap();
        c.internal_transition().unwrap();

        // Right sensor fires; center keeps its detected bit.
        c.external_transition(Duration::from_millis(20), &[SensorEvent::RightIr(false)])
            .unwrap();
        assert_eq!(
            c.state().pattern,
            SensorPattern::CENTER | SensorPattern::RIGHT
        );
        assert_eq!(c.state().drive, DriveCommand::Straight);
    }

    #[test]
    fn internal_clears_only_the_pending_flag() {
        let mut c = controller();
        c.external_transition(Duration::ZERO, &[SensorEvent::LeftIr(false)])
            .unwrap();
        assert_eq!(c.state().drive, DriveCommand::Right);

        c.internal_transition().unwrap();
        assert!(!c.state().output_pending);
        assert_eq!(c.state().drive, DriveCommand::Right);
        assert_eq!(c.state().pattern, SensorPattern::LEFT);
        assert_eq!(c.time_advance(), TimeAdvance::Never);
    }

    #[test]
    fn spurious_internal_is_rejected_without_state_change() {
        let mut c = controller();
        let before = *c.state();

        let err = c.internal_transition().unwrap_err();
        assert_eq!(err, ContractViolation::SpuriousInternal);
        assert_eq!(*c.state(), before);
    }

    #[test]
    fn unwired_light_is_rejected_without_state_change() {
        let mut c = controller();
        let before = *c.state();

        let err = c
            .external_transition(
                Duration::ZERO,
                &[
                    SensorEvent::CenterIr(false),
                    SensorEvent::AmbientLight(0.1),
                ],
            )
            .unwrap_err();

        assert_eq!(
            err,
            ContractViolation::UnwiredChannel {
                channel: InputChannel::AmbientLight
            }
        );
        // The IR event in the same batch must not have been applied.
        assert_eq!(*c.state(), before);
        assert_eq!(c.time_advance(), TimeAdvance::Never);
    }

    #[test]
    fn confluent_with_unwired_light_is_rejected_without_state_change() {
        let mut c = controller();
        c.external_transition(Duration::ZERO, &[SensorEvent::RightIr(false)])
            .unwrap();
        let before = *c.state();

        let err = c
            .confluent_transition(&[SensorEvent::AmbientLight(0.1)])
            .unwrap_err();

        assert_eq!(
            err,
            ContractViolation::UnwiredChannel {
                channel: InputChannel::AmbientLight
            }
        );
        // The internal half must not have run: the pending output (and
        // the advance that announces it) survive the rejected batch.
        assert_eq!(*c.state(), before);
        assert_eq!(c.time_advance(), TimeAdvance::IMMEDIATE);
    }

    #[test]
    fn output_is_pure_and_repeatable() {
        let mut c = controller();
        c.external_transition(Duration::ZERO, &[SensorEvent::CenterIr(false)])
            .unwrap();

        let first = c.output();
        let second = c.output();
        assert_eq!(first, second);
        assert_eq!(first, DriveTable::FAST_SIDE_REVERSED.command_for(DriveCommand::Straight));

        // Still legal (and unchanged) after the output was emitted.
        c.internal_transition().unwrap();
        assert_eq!(c.output(), first);
    }

    #[test]
    fn pending_round_trip() {
        let mut c = controller();
        assert!(c.time_advance().is_passive());

        c.external_transition(Duration::ZERO, &[SensorEvent::RightIr(false)])
            .unwrap();
        assert_eq!(c.time_advance(), TimeAdvance::IMMEDIATE);

        c.internal_transition().unwrap();
        assert!(c.time_advance().is_passive());

        // A second internal without a new batch is spurious.
        assert!(c.internal_transition().is_err());
    }

    #[test]
    fn confluent_emits_stale_then_absorbs_fresh() {
        let mut c = controller();
        c.external_transition(Duration::ZERO, &[SensorEvent::RightIr(false)])
            .unwrap();
        assert_eq!(c.state().drive, DriveCommand::Left);

        // Batch lands exactly at expiry: internal resolves first, then the
        // fresh samples are absorbed and re-arm the controller.
        c.confluent_transition(&[SensorEvent::RightIr(true), SensorEvent::CenterIr(false)])
            .unwrap();

        assert_eq!(c.state().pattern, SensorPattern::CENTER);
        assert_eq!(c.state().drive, DriveCommand::Straight);
        assert!(c.state().output_pending);
        assert_eq!(c.time_advance(), TimeAdvance::IMMEDIATE);
    }

    #[test]
    fn dark_sample_forces_stop() {
        let mut c = controller_with_light(0.3);
        c.external_transition(
            Duration::ZERO,
            &[SensorEvent::CenterIr(false), SensorEvent::AmbientLight(0.1)],
        )
        .unwrap();

        // Table says Straight; the guard overrides the final command only.
        assert_eq!(c.state().pattern, SensorPattern::CENTER);
        assert_eq!(c.state().drive, DriveCommand::Stop);
        assert_eq!(c.output(), MotorCommand::STOP);
    }

    #[test]
    fn dark_sample_is_sticky_until_bright() {
        let mut c = controller_with_light(0.3);
        c.external_transition(Duration::ZERO, &[SensorEvent::AmbientLight(0.1)])
            .unwrap();
        c.internal_transition().unwrap();

        // IR-only batch: the stored dark sample still forces Stop.
        c.external_transition(Duration::from_millis(10), &[SensorEvent::CenterIr(false)])
            .unwrap();
        assert_eq!(c.state().drive, DriveCommand::Stop);
        c.internal_transition().unwrap();

        // Bright sample restores the table's command.
        c.external_transition(Duration::from_millis(10), &[SensorEvent::AmbientLight(0.8)])
            .unwrap();
        assert_eq!(c.state().drive, DriveCommand::Straight);
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut c = controller_with_light(0.3);
        c.external_transition(
            Duration::ZERO,
            &[SensorEvent::CenterIr(false), SensorEvent::AmbientLight(0.3)],
        )
        .unwrap();

        // Exactly at the threshold is not "below".
        assert_eq!(c.state().drive, DriveCommand::Straight);
    }

    #[test]
    fn light_enabled_reflects_config() {
        assert!(!controller().light_enabled());
        assert!(controller_with_light(0.3).light_enabled());
    }
}
