//! # Linebot Host Library
//!
//! Everything the replay binary needs, split out so integration tests can
//! drive a full run without spawning a process:
//!
//! - `config`: host configuration (run cap, controller settings, trace paths)
//! - `trace`: recorded sensor traces and the merged event schedule
//! - `runner`: the single-model simulation loop
//! - `sink`: where emitted motor commands are written

pub mod config;
pub mod runner;
pub mod sink;
pub mod trace;
