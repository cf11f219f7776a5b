//! Linebot Common Library
//!
//! This crate provides the shared vocabulary and configuration loading
//! utilities for all linebot workspace crates.
//!
//! # Module Structure
//!
//! - [`channel`] - Input channel names and typed sensor events
//! - [`drive`] - Drive commands and motor actuation types
//! - [`model`] - The atomic-model contract (transitions, output, time advance)
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! linebot_common = { path = "../linebot_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use linebot_common::model::{AtomicModel, TimeAdvance};
//! use linebot_common::config::{ConfigLoader, ControllerConfig};
//! ```

pub mod channel;
pub mod config;
pub mod drive;
pub mod model;
pub mod prelude;
