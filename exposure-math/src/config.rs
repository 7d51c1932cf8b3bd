//! Exposure configuration parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Day and night extremes for a single camera setting.
///
/// The day value applies at the bright end of the transition band, the
/// night value at the dark end. Nothing requires `night > day`; clamping
/// is order-independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettingRange {
    /// Value used at full daylight
    pub day: f64,
    /// Value used at full night
    pub night: f64,
}

impl SettingRange {
    /// Clamp a value between the day and night extremes, whichever order
    /// they are configured in.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.day.min(self.night), self.day.max(self.night))
    }
}

/// Ordering violations reported by [`ExposureConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ExposureConfigError {
    #[error("night threshold {night} must be below daylight threshold {daylight}")]
    ThresholdOrder { night: f64, daylight: f64 },

    #[error("smoothing start {smoothing_start} outside ({night}, {daylight}]")]
    SmoothingStartOutOfRange {
        smoothing_start: f64,
        night: f64,
        daylight: f64,
    },
}

/// Exposure regime parameters, loaded once per run and passed by reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureConfig {
    /// Light level at or above which the camera runs on auto-exposure
    pub daylight_threshold: f64,
    /// Light level below which the full night extremes apply
    pub night_threshold: f64,
    /// Light level at which the secondary shutter easing begins
    pub smoothing_start: f64,
    /// ISO (analogue gain) extremes
    pub iso: SettingRange,
    /// Shutter time extremes in microseconds
    pub shutter_us: SettingRange,
}

impl Default for ExposureConfig {
    /// Values from the deployed rig.
    ///
    /// Note that the stock `smoothing_start` sits above the daylight
    /// threshold, which parks the secondary shutter easing: the easing
    /// branch requires `smoothing_start < light < daylight_threshold`.
    fn default() -> Self {
        Self {
            daylight_threshold: 13.0,
            night_threshold: 1.0,
            smoothing_start: 70.0,
            iso: SettingRange {
                day: 1.0,
                night: 100.0,
            },
            shutter_us: SettingRange {
                day: 100.0,
                night: 10_000_000.0,
            },
        }
    }
}

impl ExposureConfig {
    /// Check the threshold ordering invariants.
    ///
    /// Advisory only: [`compute`](crate::compute) degrades gracefully on a
    /// misordered configuration instead of failing the capture cycle, so
    /// callers typically log the violation and proceed.
    pub fn validate(&self) -> Result<(), ExposureConfigError> {
        if self.night_threshold >= self.daylight_threshold {
            return Err(ExposureConfigError::ThresholdOrder {
                night: self.night_threshold,
                daylight: self.daylight_threshold,
            });
        }
        if self.smoothing_start <= self.night_threshold
            || self.smoothing_start > self.daylight_threshold
        {
            return Err(ExposureConfigError::SmoothingStartOutOfRange {
                smoothing_start: self.smoothing_start,
                night: self.night_threshold,
                daylight: self.daylight_threshold,
            });
        }
        Ok(())
    }
}
