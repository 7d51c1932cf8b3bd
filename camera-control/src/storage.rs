//! JSON persistence for rig configuration and controller state.
//!
//! All records live as single JSON files under one root directory
//! (defaults to `~/.timelapse`): the rig configuration, the HDR
//! controller's last-change timestamp, and the most recent light
//! measurement for downstream annotation.

use std::fs;
use std::io;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use exposure_math::{ExposureConfig, ExposureSettings, LightLevel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Rig configuration persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    /// Exposure regime parameters
    pub exposure: ExposureConfig,
    /// Whether daylight captures may enable the sensor's HDR mode
    pub hdr_enabled: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            exposure: ExposureConfig::default(),
            hdr_enabled: true,
        }
    }
}

/// Most recent light evaluation, kept for overlay and logging consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measured scene light level
    pub light_level: LightLevel,
    /// Settings derived from the measurement
    pub settings: ExposureSettings,
    /// When the measurement was taken
    pub captured_at: DateTime<Utc>,
}

/// Durable storage for the HDR controller's last-change timestamp.
///
/// Must survive process restarts; a single ISO-8601 timestamp record is
/// sufficient.
pub trait HdrStateStore {
    /// Load the last applied transition time, if one has been recorded.
    fn load_last_change(&self) -> io::Result<Option<DateTime<Utc>>>;

    /// Record an applied transition time.
    fn save_last_change(&mut self, at: DateTime<Utc>) -> io::Result<()>;
}

/// On-disk form of the last-change record.
#[derive(Debug, Serialize, Deserialize)]
struct LastChangeRecord {
    last_change: DateTime<Utc>,
}

/// Storage manager for rig configuration and controller state.
///
/// Files are created lazily on first save; reads of records that were
/// never written return `None`.
#[derive(Debug, Clone)]
pub struct ControlStorage {
    /// Root directory for all records (e.g. ~/.timelapse)
    root_path: PathBuf,
}

impl ControlStorage {
    /// Create storage rooted at the default path (`~/.timelapse`).
    pub fn new() -> io::Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME not set"))?;
        Ok(Self {
            root_path: PathBuf::from(home).join(".timelapse"),
        })
    }

    /// Create storage rooted at a custom path.
    pub fn with_path(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Get the root storage path.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn rig_config_path(&self) -> PathBuf {
        self.root_path.join("config.json")
    }

    fn last_hdr_change_path(&self) -> PathBuf {
        self.root_path.join("last_hdr_change.json")
    }

    fn last_measurement_path(&self) -> PathBuf {
        self.root_path.join("last_measurement.json")
    }

    /// Get the persisted rig configuration.
    ///
    /// Returns None if no configuration has been saved.
    /// Returns Some(Err) if the file exists but cannot be loaded.
    pub fn get_rig_config(&self) -> Option<io::Result<RigConfig>> {
        let path = self.rig_config_path();

        if !path.exists() {
            return None;
        }

        Some(read_json(&path))
    }

    /// Save the rig configuration.
    ///
    /// Creates the storage directory if it doesn't exist.
    /// Returns the path where the configuration was saved.
    pub fn save_rig_config(&self, config: &RigConfig) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root_path)?;

        let path = self.rig_config_path();
        write_json(&path, config)?;
        Ok(path)
    }

    /// Get the most recent measurement record.
    ///
    /// Returns None if no measurement has been recorded.
    /// Returns Some(Err) if the file exists but cannot be loaded.
    pub fn get_last_measurement(&self) -> Option<io::Result<Measurement>> {
        let path = self.last_measurement_path();

        if !path.exists() {
            return None;
        }

        Some(read_json(&path))
    }

    /// Save the most recent measurement record.
    ///
    /// Creates the storage directory if it doesn't exist.
    /// Returns the path where the record was saved.
    pub fn save_last_measurement(&self, measurement: &Measurement) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root_path)?;

        let path = self.last_measurement_path();
        write_json(&path, measurement)?;
        Ok(path)
    }
}

impl Default for ControlStorage {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_path(PathBuf::from(".timelapse")))
    }
}

impl HdrStateStore for ControlStorage {
    fn load_last_change(&self) -> io::Result<Option<DateTime<Utc>>> {
        let path = self.last_hdr_change_path();

        if !path.exists() {
            return Ok(None);
        }

        let record: LastChangeRecord = read_json(&path)?;
        Ok(Some(record.last_change))
    }

    fn save_last_change(&mut self, at: DateTime<Utc>) -> io::Result<()> {
        fs::create_dir_all(&self.root_path)?;
        write_json(&self.last_hdr_change_path(), &LastChangeRecord { last_change: at })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> io::Result<T> {
    let file = fs::File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_storage() -> (tempfile::TempDir, ControlStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = ControlStorage::with_path(dir.path().join("state"));
        (dir, storage)
    }

    #[test]
    fn missing_records_read_as_none() {
        let (_dir, storage) = test_storage();
        assert!(storage.get_rig_config().is_none());
        assert!(storage.get_last_measurement().is_none());
        assert_eq!(storage.load_last_change().unwrap(), None);
    }

    #[test]
    fn rig_config_round_trips() {
        let (_dir, storage) = test_storage();

        let config = RigConfig {
            hdr_enabled: false,
            ..RigConfig::default()
        };
        let path = storage.save_rig_config(&config).unwrap();
        assert!(path.exists());

        let loaded = storage
            .get_rig_config()
            .expect("config should exist")
            .expect("config should load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn last_change_round_trips() {
        let (_dir, mut storage) = test_storage();

        let at = Utc.with_ymd_and_hms(2024, 10, 5, 18, 30, 0).unwrap();
        storage.save_last_change(at).unwrap();

        assert_eq!(storage.load_last_change().unwrap(), Some(at));
    }

    #[test]
    fn last_change_survives_reopening() {
        let (_dir, mut storage) = test_storage();

        let at = Utc.with_ymd_and_hms(2024, 10, 5, 18, 30, 0).unwrap();
        storage.save_last_change(at).unwrap();

        let reopened = ControlStorage::with_path(storage.root_path().to_path_buf());
        assert_eq!(reopened.load_last_change().unwrap(), Some(at));
    }

    #[test]
    fn corrupt_records_surface_invalid_data() {
        let (_dir, storage) = test_storage();

        fs::create_dir_all(storage.root_path()).unwrap();
        fs::write(storage.root_path().join("last_hdr_change.json"), "not json").unwrap();

        let err = storage.load_last_change().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn measurement_round_trips() {
        let (_dir, storage) = test_storage();

        let measurement = Measurement {
            light_level: LightLevel::new(7.2).unwrap(),
            settings: ExposureSettings::Fixed {
                iso: 49,
                shutter_us: 5_166_617,
            },
            captured_at: Utc.with_ymd_and_hms(2024, 10, 5, 18, 30, 0).unwrap(),
        };
        storage.save_last_measurement(&measurement).unwrap();

        let loaded = storage
            .get_last_measurement()
            .expect("measurement should exist")
            .expect("measurement should load");
        assert_eq!(loaded, measurement);
    }

    #[test]
    fn stock_rig_config_matches_deployment_values() {
        let config = RigConfig::default();
        assert!(config.hdr_enabled);
        assert_eq!(config.exposure.daylight_threshold, 13.0);
        assert_eq!(config.exposure.night_threshold, 1.0);
    }
}
