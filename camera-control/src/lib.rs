//! Camera mode control for the timelapse rig.
//!
//! Wraps the sensor's wide-dynamic-range (HDR) hardware mode in a
//! debounced controller, persists controller state across process
//! restarts, and ships the `exposure_tool` CLI for operating the rig by
//! hand.
//!
//! The exposure decision math lives in the `exposure-math` crate; this
//! crate owns everything with side effects: hardware access, state
//! persistence, logging.

pub mod hdr;
pub mod storage;
pub mod switch;

pub use hdr::{HdrDecision, HdrModeController, HDR_COOLDOWN_SECS, HDR_SETTLE_DELAY};
pub use storage::{ControlStorage, HdrStateStore, Measurement, RigConfig};
pub use switch::{HdrSwitch, V4l2CtlSwitch};
