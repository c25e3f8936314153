//! Driver registry for rack backplanes.
//!
//! Provides a `DriverRegistry` struct mapping driver names to factories that
//! build a [`Backplane`]: the I/O port and the clock the control unit polls
//! with. This uses constructor-injection rather than global state.

use std::collections::HashMap;

use hbs_common::config::HbsConfig;
use hbs_common::io::DigitalIo;
use hbs_common::time::{Clock, SystemClock};
use tracing::info;

use crate::error::HalError;
use crate::simulation::{RackSimulator, TimeBase};

/// Name of the built-in simulation driver.
pub const SIMULATION_DRIVER: &str = "simulation";

/// I/O port plus the clock its poll loops run on.
pub struct Backplane {
    /// Digital I/O port.
    pub io: Box<dyn DigitalIo>,
    /// Poll clock.
    pub clock: Box<dyn Clock>,
}

/// Factory building a backplane from the process configuration.
pub type DriverFactory = fn(&HbsConfig) -> Result<Backplane, HalError>;

/// Registry of available backplane drivers.
///
/// Constructed at startup, populated via `register()`, and consulted once by
/// the binary. No global state, testable in isolation.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with every driver shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(SIMULATION_DRIVER, create_simulation);
        registry
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Build a backplane by driver name.
    ///
    /// # Errors
    /// Returns `HalError::DriverNotFound` if no driver with the given name is
    /// registered, or whatever the factory reports.
    pub fn create(&self, name: &str, config: &HbsConfig) -> Result<Backplane, HalError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| HalError::DriverNotFound(name.to_string()))?;
        factory(config)
    }

    /// List all registered driver names.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock rack simulator.
fn create_simulation(config: &HbsConfig) -> Result<Backplane, HalError> {
    config
        .simulation
        .validate()
        .map_err(|e| HalError::ConfigError(e.to_string()))?;
    let simulator = RackSimulator::new(&config.simulation, TimeBase::wall());
    info!(tick = ?config.motion.tick(), "Simulation backplane created");
    Ok(Backplane {
        io: Box::new(simulator),
        clock: Box::new(SystemClock::new(config.motion.tick())),
    })
}
