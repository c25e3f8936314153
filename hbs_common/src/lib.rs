//! HBS Common Library
//!
//! This crate provides the shared vocabulary of the high-bay storage
//! workspace: slot addressing, axis positions, result codes, the fixed
//! I/O wiring table and configuration loading.
//!
//! # Module Structure
//!
//! - [`consts`] - Rack geometry and default paths
//! - [`types`] - Slot coordinates, axis positions, system status
//! - [`fault`] - Result codes returned by every core operation
//! - [`io`] - Digital I/O port boundary and wiring table
//! - [`time`] - Clock abstraction driving every poll loop
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use hbs_common::prelude::*;
//!
//! let slot = SlotCoordinate::new(3, 2).unwrap();
//! assert_eq!(slot.slot_number().get(), 13);
//! ```

pub mod config;
pub mod consts;
pub mod fault;
pub mod io;
pub mod prelude;
pub mod time;
pub mod types;
