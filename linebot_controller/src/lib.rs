//! # Linebot Controller Library
//!
//! Discrete-event controller for a three-sensor line-following robot.
//! The controller is an atomic model: it reacts to batched sensor events,
//! derives a drive command from a declarative decision table, and emits one
//! motor command per accepted batch. It never polls and keeps no clock of
//! its own; the host scheduler owns time and drives the model through the
//! [`linebot_common::model::AtomicModel`] contract.
//!
//! ## Structure
//!
//! 1. **SensorPattern / DecisionTable**: which way to steer, as data
//! 2. **DriveTable**: per-wheel duty and polarity for each drive command, as data
//! 3. **LineBotController**: the state machine tying both tables to the
//!    transition contract

pub mod controller;
pub mod decision;

pub use controller::{ControllerState, LineBotController};
pub use decision::{DecisionTable, DriveTable, SensorPattern};
