//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the TOML configuration
//! of the rack. Every section has defaults, so an empty file (or a missing
//! section) runs the rack with its stock timing.
//!
//! # Usage
//!
//! ```rust,no_run
//! use hbs_common::config::{ConfigLoader, HbsConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = HbsConfig::load(Path::new("config/hbs.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::consts::{DEFAULT_SNAPSHOT_PATH, TICK_US};

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "hbs-rack-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "hbs".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Axis timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    /// Poll tick period [µs].
    pub tick_us: u64,
    /// Dwell after de-energizing, before the final position check [s].
    pub settle_s: f64,
    /// X stall window [s].
    pub x_timeout_s: f64,
    /// Y stall window [s].
    pub y_timeout_s: f64,
    /// Z stall window [s].
    pub z_timeout_s: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            tick_us: TICK_US,
            settle_s: 0.1,
            x_timeout_s: 2.0,
            y_timeout_s: 2.5,
            z_timeout_s: 1.5,
        }
    }
}

impl MotionConfig {
    /// Tick period.
    pub fn tick(&self) -> Duration {
        Duration::from_micros(self.tick_us)
    }

    /// Settle pause.
    pub fn settle(&self) -> Duration {
        Duration::from_secs_f64(self.settle_s)
    }

    /// X stall window.
    pub fn x_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.x_timeout_s)
    }

    /// Y stall window.
    pub fn y_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.y_timeout_s)
    }

    /// Z stall window.
    pub fn z_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.z_timeout_s)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if a duration is not positive or
    /// the tick is longer than the shortest stall window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("x_timeout_s", self.x_timeout_s),
            ("y_timeout_s", self.y_timeout_s),
            ("z_timeout_s", self.z_timeout_s),
        ];
        for (name, value) in windows {
            if !(value > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "motion.{name} must be > 0, got {value}"
                )));
            }
        }
        if self.settle_s < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "motion.settle_s must be >= 0, got {}",
                self.settle_s
            )));
        }
        if self.tick_us == 0 {
            return Err(ConfigError::ValidationError(
                "motion.tick_us must be > 0".to_string(),
            ));
        }
        let shortest = windows
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::INFINITY, f64::min);
        if self.tick().as_secs_f64() >= shortest {
            return Err(ConfigError::ValidationError(format!(
                "motion.tick_us ({}) must be shorter than the shortest timeout ({shortest}s)",
                self.tick_us
            )));
        }
        Ok(())
    }
}

/// Conveyor timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConveyorConfig {
    /// Maximum intake run waiting for the light barrier [s].
    pub input_timeout_s: f64,
    /// Debounce after the light barrier trips [s].
    pub input_debounce_s: f64,
    /// Fixed release run [s].
    pub output_run_s: f64,
}

impl Default for ConveyorConfig {
    fn default() -> Self {
        Self {
            input_timeout_s: 5.0,
            input_debounce_s: 0.3,
            output_run_s: 6.0,
        }
    }
}

impl ConveyorConfig {
    /// Intake window.
    pub fn input_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.input_timeout_s)
    }

    /// Light-barrier debounce.
    pub fn input_debounce(&self) -> Duration {
        Duration::from_secs_f64(self.input_debounce_s)
    }

    /// Release window.
    pub fn output_run(&self) -> Duration {
        Duration::from_secs_f64(self.output_run_s)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("input_timeout_s", self.input_timeout_s),
            ("input_debounce_s", self.input_debounce_s),
            ("output_run_s", self.output_run_s),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "conveyor.{name} must be a finite value >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Inventory persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Snapshot file of the occupancy grid.
    pub snapshot_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

/// Physics of the rack simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// X travel speed [columns/s].
    pub x_speed: f64,
    /// Speed factor while X slow is energized.
    pub x_slow_factor: f64,
    /// Y travel speed [ranks/s].
    pub y_speed: f64,
    /// Z travel speed [sub-positions/s].
    pub z_speed: f64,
    /// Half-width of a position sensor's detection window [units].
    pub sensor_window: f64,
    /// Time for the intake belt to bring a box to the light barrier [s].
    pub belt_delivery_s: f64,
    /// Initial carriage position (X, Y rank, Z) in axis units.
    pub start: [f64; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            x_speed: 2.5,
            x_slow_factor: 0.4,
            y_speed: 2.0,
            z_speed: 3.0,
            sensor_window: 0.1,
            belt_delivery_s: 1.5,
            start: [10.0, 1.0, 1.0],
        }
    }
}

impl SimulationConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("x_speed", self.x_speed),
            ("y_speed", self.y_speed),
            ("z_speed", self.z_speed),
            ("x_slow_factor", self.x_slow_factor),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "simulation.{name} must be > 0, got {value}"
                )));
            }
        }
        if !(self.sensor_window > 0.0 && self.sensor_window < 0.5) {
            return Err(ConfigError::ValidationError(format!(
                "simulation.sensor_window must be in (0, 0.5), got {}",
                self.sensor_window
            )));
        }
        Ok(())
    }
}

/// Complete configuration of the rack process.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "hbs"
///
/// [motion]
/// x_timeout_s = 2.0
///
/// [storage]
/// snapshot_path = "obj/storage_places.bin"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HbsConfig {
    /// Common fields.
    pub shared: SharedConfig,
    /// Axis timing.
    pub motion: MotionConfig,
    /// Conveyor timing.
    pub conveyor: ConveyorConfig,
    /// Inventory persistence.
    pub storage: StorageConfig,
    /// Rack simulator physics.
    pub simulation: SimulationConfig,
}

impl HbsConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.motion.validate()?;
        self.conveyor.validate()?;
        self.simulation.validate()
    }
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for any type implementing
/// `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
