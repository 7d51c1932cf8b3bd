//! Operator CLI for the timelapse exposure controller.
//!
//! Subcommands:
//! - `compute`: print the exposure decision for a measured light level
//! - `hdr`: run one HDR controller cycle against the camera
//! - `status`: report the current hardware mode and cooldown state

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use camera_control::switch::DEFAULT_SUBDEVICE;
use camera_control::{
    ControlStorage, HdrModeController, Measurement, RigConfig, V4l2CtlSwitch, HDR_SETTLE_DELAY,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use exposure_math::{compute, ExposureSettings, LightLevel};
use tracing::warn;

/// Timelapse exposure control tool
#[derive(Parser, Debug)]
#[command(name = "exposure_tool")]
#[command(about = "Exposure and HDR control for the timelapse camera")]
#[command(version)]
struct Args {
    /// Storage directory for rig config and controller state
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// V4L2 subdevice exposing the wide dynamic range control
    #[arg(long, global = true, default_value = DEFAULT_SUBDEVICE)]
    device: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute exposure settings for a measured light level
    Compute {
        /// Measured scene light level (mean grayscale intensity)
        #[arg(short, long)]
        light: f64,

        /// Persist the result as the last measurement record
        #[arg(long)]
        record: bool,
    },

    /// Evaluate one HDR controller cycle for a measured light level
    Hdr {
        /// Measured scene light level
        #[arg(short, long)]
        light: f64,

        /// Override the post-switch settle wait in seconds
        #[arg(long)]
        settle_secs: Option<u64>,
    },

    /// Report current hardware mode and cooldown state
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let storage = match &args.storage_dir {
        Some(dir) => ControlStorage::with_path(dir.clone()),
        None => ControlStorage::new().context("resolving storage directory")?,
    };
    let config = load_rig_config(&storage)?;

    if let Err(err) = config.exposure.validate() {
        warn!("exposure config is degenerate, proceeding anyway: {err}");
    }

    match args.command {
        Command::Compute { light, record } => {
            let light = LightLevel::new(light)?;
            let settings = compute(light, &config.exposure);
            print_settings(light, settings);

            if record {
                storage
                    .save_last_measurement(&Measurement {
                        light_level: light,
                        settings,
                        captured_at: Utc::now(),
                    })
                    .context("recording measurement")?;
            }
        }

        Command::Hdr { light, settle_secs } => {
            let light = LightLevel::new(light)?;
            let settings = compute(light, &config.exposure);
            let desired = settings.is_auto() && config.hdr_enabled;

            let switch = V4l2CtlSwitch::with_device(&args.device);
            let settle = settle_secs
                .map(Duration::from_secs)
                .unwrap_or(HDR_SETTLE_DELAY);
            let mut controller = HdrModeController::with_settle_delay(switch, storage, settle)
                .context("loading HDR controller state")?;

            let decision = controller
                .evaluate(desired, Utc::now())
                .context("evaluating HDR mode")?;

            print_settings(light, settings);
            println!(
                "hdr: desired {}, {}, now {}",
                on_off(decision.desired),
                if decision.applied {
                    "applied"
                } else {
                    "unchanged"
                },
                on_off(decision.current_state),
            );
        }

        Command::Status => {
            let switch = V4l2CtlSwitch::with_device(&args.device);
            let mut controller =
                HdrModeController::new(switch, storage).context("loading HDR controller state")?;

            let mode = controller
                .current_mode()
                .context("reading wide dynamic range control")?;
            println!("wide dynamic range: {}", on_off(mode));

            if controller.last_change_at() == DateTime::<Utc>::MIN_UTC {
                println!("no mode change recorded");
            } else {
                println!("last change: {}", controller.last_change_at().to_rfc3339());
            }
            println!(
                "cooldown: {}",
                if controller.in_cooldown(Utc::now()) {
                    "active"
                } else {
                    "expired"
                }
            );
        }
    }

    Ok(())
}

/// Load the persisted rig configuration, falling back to stock values on a
/// fresh install.
fn load_rig_config(storage: &ControlStorage) -> Result<RigConfig> {
    match storage.get_rig_config() {
        Some(config) => config.context("loading rig config"),
        None => Ok(RigConfig::default()),
    }
}

fn print_settings(light: LightLevel, settings: ExposureSettings) {
    match settings {
        ExposureSettings::Auto => {
            println!("light {:.1}: daylight, auto exposure", light.value());
        }
        ExposureSettings::Fixed { iso, shutter_us } => {
            println!(
                "light {:.1}: iso {iso}, shutter {shutter_us} us",
                light.value()
            );
        }
    }
}

fn on_off(state: bool) -> &'static str {
    if state {
        "on"
    } else {
        "off"
    }
}
