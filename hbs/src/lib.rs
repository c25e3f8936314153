//! # HBS process
//!
//! Command transport of the high-bay storage rack.
//!
//! - [`command`] - JSON payload decoding
//! - [`dispatch`] - Command execution and status/result publishing

pub mod command;
pub mod dispatch;

pub use crate::command::{Command, CommandError};
pub use crate::dispatch::{Dispatcher, Flow, Indicator, publish_abort};
