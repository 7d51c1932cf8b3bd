//! Wide-dynamic-range mode capability.
//!
//! The physical control surface for the sensor's HDR mode is abstracted
//! behind a read/write trait so the controller can be exercised against
//! fakes. The production implementation drives the V4L2 subdevice through
//! the `v4l2-ctl` utility.

use std::io;
use std::process::Command;

use tracing::debug;

/// Default V4L2 subdevice exposing the wide dynamic range control.
pub const DEFAULT_SUBDEVICE: &str = "/dev/v4l-subdev0";

/// Name of the V4L2 control toggled for HDR capture.
pub const WDR_CONTROL: &str = "wide_dynamic_range";

/// Read/write access to the sensor's wide-dynamic-range mode.
///
/// Any concrete control surface (ioctl, sysfs attribute, vendor tool)
/// satisfies this contract; the controller only needs these two
/// operations.
pub trait HdrSwitch {
    /// Read the current hardware mode.
    fn read_mode(&mut self) -> io::Result<bool>;

    /// Set the hardware mode.
    fn write_mode(&mut self, enable: bool) -> io::Result<()>;
}

/// `v4l2-ctl` backed switch for the wide dynamic range control.
#[derive(Debug, Clone)]
pub struct V4l2CtlSwitch {
    /// Path to the V4L2 subdevice
    device: String,
    /// Control name to get and set
    control: String,
}

impl V4l2CtlSwitch {
    /// Switch for the default subdevice and control.
    pub fn new() -> Self {
        Self::with_device(DEFAULT_SUBDEVICE)
    }

    /// Switch for a specific subdevice path.
    pub fn with_device(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            control: WDR_CONTROL.to_string(),
        }
    }
}

impl Default for V4l2CtlSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl HdrSwitch for V4l2CtlSwitch {
    fn read_mode(&mut self) -> io::Result<bool> {
        let output = Command::new("v4l2-ctl")
            .arg(format!("--get-ctrl={}", self.control))
            .args(["-d", &self.device])
            .output()?;
        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("v4l2-ctl --get-ctrl exited with {}", output.status),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_control_value(&stdout, &self.control).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unexpected v4l2-ctl output: {stdout:?}"),
            )
        })
    }

    fn write_mode(&mut self, enable: bool) -> io::Result<()> {
        debug!(device = %self.device, enable, "setting {}", self.control);
        let status = Command::new("v4l2-ctl")
            .arg("--set-ctrl")
            .arg(format!("{}={}", self.control, u8::from(enable)))
            .args(["-d", &self.device])
            .status()?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("v4l2-ctl --set-ctrl exited with {status}"),
            ));
        }
        Ok(())
    }
}

/// Parse a `v4l2-ctl --get-ctrl` output line of the form `name: value`.
///
/// Returns the control state, or `None` when no such line is present or
/// the value is not a plain 0/1.
fn parse_control_value(output: &str, control: &str) -> Option<bool> {
    output.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim() != control {
            return None;
        }
        match value.trim() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enabled_and_disabled_states() {
        assert_eq!(
            parse_control_value("wide_dynamic_range: 1\n", WDR_CONTROL),
            Some(true)
        );
        assert_eq!(
            parse_control_value("wide_dynamic_range: 0\n", WDR_CONTROL),
            Some(false)
        );
    }

    #[test]
    fn ignores_other_controls() {
        let output = "exposure: 1\nanalogue_gain: 128\n";
        assert_eq!(parse_control_value(output, WDR_CONTROL), None);
    }

    #[test]
    fn finds_the_control_among_several() {
        let output = "exposure: 1\nwide_dynamic_range: 1\nanalogue_gain: 128\n";
        assert_eq!(parse_control_value(output, WDR_CONTROL), Some(true));
    }

    #[test]
    fn rejects_non_binary_values() {
        assert_eq!(
            parse_control_value("wide_dynamic_range: 3\n", WDR_CONTROL),
            None
        );
        assert_eq!(
            parse_control_value("wide_dynamic_range:\n", WDR_CONTROL),
            None
        );
    }
}
