//! Configuration for the hygrolog monitor.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::history::DEFAULT_WINDOW_CAPACITY;
use crate::render::DEFAULT_RENDER_PERIOD;
use crate::sensor::DEFAULT_BAUD_RATE;

/// Main configuration for the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Serial port the sensor board is attached to
    pub serial_port: String,

    /// Baud rate of the serial link
    pub baud_rate: u32,

    /// Number of readings retained in the rolling window
    pub window_capacity: usize,

    /// Period of the presentation redraw tick
    #[serde(with = "duration_serde")]
    pub render_period: Duration,

    /// How often the window is snapshotted to disk
    pub export_interval: ExportInterval,

    /// Directory the snapshot file is written into
    pub export_path: PathBuf,

    /// Path for storing state and pipeline stats
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hygrolog");

        Self {
            serial_port: default_serial_port().to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            render_period: DEFAULT_RENDER_PERIOD,
            export_interval: ExportInterval::TenMinutes,
            export_path: data_dir.join("exports"),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hygrolog")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

fn default_serial_port() -> &'static str {
    if cfg!(windows) {
        "COM3"
    } else {
        "/dev/ttyUSB0"
    }
}

/// How often the rolling window is written to disk.
///
/// A closed set; the exporter consumes one of these, it never derives its
/// own cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportInterval {
    /// Every 10 minutes
    TenMinutes,
    /// Every hour
    Hourly,
    /// Every day
    Daily,
}

impl ExportInterval {
    /// The wall-clock period between exports.
    pub fn period(self) -> Duration {
        match self {
            ExportInterval::TenMinutes => Duration::from_secs(10 * 60),
            ExportInterval::Hourly => Duration::from_secs(60 * 60),
            ExportInterval::Daily => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl std::fmt::Display for ExportInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportInterval::TenMinutes => write!(f, "every 10 minutes"),
            ExportInterval::Hourly => write!(f, "every hour"),
            ExportInterval::Daily => write!(f, "every day"),
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
