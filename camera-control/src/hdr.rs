//! Debounced control of the sensor's wide-dynamic-range mode.
//!
//! Switching the hardware mode is visually disruptive: the sensor flickers
//! and the exposure excursion takes a moment to recover. Around dawn and
//! dusk the measured light level oscillates across the daylight threshold,
//! so a naive toggle would flap. Mode changes are therefore rate-limited
//! by a cooldown that survives process restarts, and every applied change
//! blocks until the sensor output has settled.

use std::io;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::storage::HdrStateStore;
use crate::switch::HdrSwitch;

/// Minimum wall-clock time between applied mode changes, in seconds.
pub const HDR_COOLDOWN_SECS: i64 = 3_600;

/// Time to wait after a mode change for the sensor output to stabilize.
pub const HDR_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Outcome of a single HDR evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HdrDecision {
    /// Mode the caller's policy asked for
    pub desired: bool,
    /// Whether the hardware mode was changed during this evaluation
    pub applied: bool,
    /// Hardware mode after the evaluation
    pub current_state: bool,
}

/// Debounced controller for the hardware wide-dynamic-range mode.
///
/// The controller owns the persisted last-change timestamp: it is loaded
/// once at construction and written back only when a transition is
/// applied. The hardware mode itself is never cached across evaluations:
/// other writers may exist, so the switch is re-read every call.
pub struct HdrModeController<S, T> {
    switch: S,
    store: T,
    last_change_at: DateTime<Utc>,
    settle_delay: Duration,
}

impl<S: HdrSwitch, T: HdrStateStore> HdrModeController<S, T> {
    /// Build a controller, loading any persisted last-change record.
    ///
    /// A missing record means the mode has never been changed, so the
    /// cooldown starts expired.
    pub fn new(switch: S, store: T) -> io::Result<Self> {
        Self::with_settle_delay(switch, store, HDR_SETTLE_DELAY)
    }

    /// Build a controller with a custom settle delay.
    ///
    /// Production uses [`HDR_SETTLE_DELAY`]; tests shorten the wait.
    pub fn with_settle_delay(switch: S, store: T, settle_delay: Duration) -> io::Result<Self> {
        let last_change_at = store
            .load_last_change()?
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Ok(Self {
            switch,
            store,
            last_change_at,
            settle_delay,
        })
    }

    /// Time of the most recent applied transition.
    ///
    /// `DateTime::<Utc>::MIN_UTC` when no transition has ever been applied.
    pub fn last_change_at(&self) -> DateTime<Utc> {
        self.last_change_at
    }

    /// Whether a change at `now` would be suppressed by the cooldown.
    ///
    /// A backwards clock step makes `now - last_change_at` negative, which
    /// also reads as inside the cooldown.
    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_change_at) < TimeDelta::seconds(HDR_COOLDOWN_SECS)
    }

    /// Read the current hardware mode.
    pub fn current_mode(&mut self) -> io::Result<bool> {
        self.switch.read_mode()
    }

    /// Drive the hardware mode toward `desired`, rate-limited by the
    /// cooldown.
    ///
    /// Re-reads the hardware mode, then either:
    /// - no-ops when it already matches `desired`,
    /// - suppresses the change while the cooldown from the previous
    ///   applied change is still running, or
    /// - writes the new mode, blocks for the settle delay, and persists
    ///   `now` as the last-change time.
    ///
    /// The settle wait is deliberately synchronous: camera reconfiguration
    /// must not start until the sensor output has stabilized.
    pub fn evaluate(&mut self, desired: bool, now: DateTime<Utc>) -> io::Result<HdrDecision> {
        let current = self.switch.read_mode()?;

        if desired == current {
            return Ok(HdrDecision {
                desired,
                applied: false,
                current_state: current,
            });
        }

        if self.in_cooldown(now) {
            debug!(current, desired, "HDR change suppressed by cooldown");
            return Ok(HdrDecision {
                desired,
                applied: false,
                current_state: current,
            });
        }

        info!(current, desired, "switching wide dynamic range mode");
        self.switch.write_mode(desired)?;
        std::thread::sleep(self.settle_delay);

        self.last_change_at = now;
        self.store.save_last_change(now)?;

        Ok(HdrDecision {
            desired,
            applied: true,
            current_state: desired,
        })
    }
}
