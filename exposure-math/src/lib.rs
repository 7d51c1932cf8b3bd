//! Exposure decision math for the timelapse camera.
//!
//! Maps a measured scene light level to camera exposure settings across
//! three regimes:
//!
//! - **Daylight**: the camera's own auto-exposure takes over.
//! - **Night**: fixed maximum ISO and slowest shutter.
//! - **Transition**: a linear ramp between the two, with a second easing
//!   stage that converges the shutter onto its daylight value before the
//!   auto-exposure handover.
//!
//! This crate is pure math: no I/O, no clocks, no hardware access. The
//! hardware-facing side of the rig lives in the `camera-control` crate.

mod calculator;
mod config;
mod light;

pub use calculator::{compute, ExposureSettings};
pub use config::{ExposureConfig, ExposureConfigError, SettingRange};
pub use light::{LightLevel, LightLevelError};
