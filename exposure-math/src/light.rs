//! Scene light level measurement type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors rejected at the measurement boundary.
#[derive(Debug, Error, PartialEq)]
pub enum LightLevelError {
    #[error("light level must be finite, got {0}")]
    NotFinite(f64),

    #[error("light level must be non-negative, got {0}")]
    Negative(f64),
}

/// Scene brightness proxy, derived upstream from the mean grayscale
/// intensity of a metering frame. Unitless and non-negative.
///
/// Construction is the validation boundary: NaN, infinite, and negative
/// measurements are rejected here, so any held `LightLevel` is a finite,
/// non-negative value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct LightLevel(f64);

impl LightLevel {
    /// Validate a raw measurement.
    pub fn new(value: f64) -> Result<Self, LightLevelError> {
        if !value.is_finite() {
            return Err(LightLevelError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(LightLevelError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Get the measurement as a raw value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for LightLevel {
    type Error = LightLevelError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LightLevel> for f64 {
    fn from(light: LightLevel) -> f64 {
        light.0
    }
}
