//! Light level to exposure settings mapping.

use serde::{Deserialize, Serialize};

use crate::{ExposureConfig, LightLevel, SettingRange};

/// Exposure settings for one capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExposureSettings {
    /// Daylight regime: the camera's own auto-exposure is in control.
    Auto,
    /// Explicit night or transition values.
    Fixed {
        /// Analogue gain the sensor should run at
        iso: u32,
        /// Shutter time in microseconds
        shutter_us: u64,
    },
}

impl ExposureSettings {
    /// True in the daylight regime.
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// Compute exposure settings for a measured light level.
///
/// Total, pure, and deterministic: every valid light level maps to a
/// setting, and a degenerate configuration (misordered thresholds, a
/// smoothing start outside the transition band) degrades to clamped values
/// rather than failing.
///
/// In the transition band the ISO and shutter ramp linearly from the night
/// extremes toward the day values. The shutter additionally gets a second
/// easing stage above `smoothing_start`, pulling it the rest of the way to
/// its day value before the handover to auto-exposure. A single linear
/// ramp leaves a visible brightness jump exactly at the daylight cutover;
/// the easing stage converges the shutter first.
///
/// Both values are clamped between the configured day and night extremes
/// and rounded to integers only at the return edge.
pub fn compute(light: LightLevel, config: &ExposureConfig) -> ExposureSettings {
    let light = light.value();

    if light >= config.daylight_threshold {
        return ExposureSettings::Auto;
    }

    if light < config.night_threshold {
        return ExposureSettings::Fixed {
            iso: config.iso.night.round() as u32,
            shutter_us: config.shutter_us.night.round() as u64,
        };
    }

    // Transition band: t is 0 at the night boundary and approaches 1 at
    // the daylight boundary.
    let t = (light - config.night_threshold)
        / (config.daylight_threshold - config.night_threshold);

    let iso = config.iso.clamp(ramp(&config.iso, t));
    let mut shutter = config.shutter_us.clamp(ramp(&config.shutter_us, t));

    // Secondary shutter easing. Skipped when the easing window is empty or
    // inverted (smoothing start at or beyond the daylight threshold) so the
    // blend can neither divide by zero nor run backwards.
    let window = config.daylight_threshold - config.smoothing_start;
    if light > config.smoothing_start && window > 0.0 {
        let r = (light - config.smoothing_start) / window;
        shutter = (1.0 - r) * shutter + r * config.shutter_us.day;
    }

    ExposureSettings::Fixed {
        iso: iso.round() as u32,
        shutter_us: shutter.round() as u64,
    }
}

/// Linear ramp from the night extreme (t = 0) toward the day value (t = 1).
fn ramp(range: &SettingRange, t: f64) -> f64 {
    range.day + (range.night - range.day) * (1.0 - t)
}
