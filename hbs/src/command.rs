//! Command payload decoding.
//!
//! A payload is one JSON object:
//!
//! ```json
//! {"operation": "rearrange", "x": 2, "z": 1, "x_new": 4, "z_new": 3}
//! ```
//!
//! Keys and the operation name are matched case-insensitively. Arguments are
//! taken in the fixed order `x`, `z`, `x_new`, `z_new`; an operation reads as
//! many as it needs and ignores the rest.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error};

/// Argument keys, in positional order.
const ARG_KEYS: [&str; 4] = ["x", "z", "x_new", "z_new"];

/// A decoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Store a box from the input dock.
    Store { x: u8, z: u8 },
    /// Deliver a stored box to the output dock.
    Destore { x: u8, z: u8 },
    /// Move a stored box to another slot.
    Rearrange { x: u8, z: u8, x_new: u8, z_new: u8 },
    /// Store at a random free slot.
    StoreRandom,
    /// Deliver from a random occupied slot.
    DestoreRandom,
    /// Initialize X.
    InitX,
    /// Initialize Y.
    InitY,
    /// Initialize Z.
    InitZ,
    /// Publish the occupancy summary.
    ShowOccupancy,
    /// Drop a box left in transit at the output dock.
    Release,
    /// End the dispatch loop.
    Shutdown,
}

impl Command {
    /// Operation name as it appears on the transport.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Store { .. } => "store",
            Self::Destore { .. } => "destore",
            Self::Rearrange { .. } => "rearrange",
            Self::StoreRandom => "store_random",
            Self::DestoreRandom => "destore_random",
            Self::InitX => "init_x",
            Self::InitY => "init_y",
            Self::InitZ => "init_z",
            Self::ShowOccupancy => "show_occupancy",
            Self::Release => "release",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Payload rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Not a JSON object.
    #[error("payload is not a JSON object")]
    JsonFormat,

    /// No `operation` key.
    #[error("keyword 'operation' missing")]
    NoOperation,

    /// Operation not recognized.
    #[error("command not recognized: '{0}'")]
    Unknown(String),

    /// A required argument is missing or not a small unsigned integer.
    #[error("wrong arguments for '{0}'")]
    WrongArgs(&'static str),
}

impl CommandError {
    /// Result code published on the transport.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::JsonFormat => "err_json_format",
            Self::NoOperation => "err_json_noop",
            Self::Unknown(_) => "err_cmd_unknown",
            Self::WrongArgs(_) => "err_wrong_args",
        }
    }
}

/// Decode one payload.
pub fn decode(payload: &str) -> Result<Command, CommandError> {
    let fields = match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => fold_keys(map),
        _ => {
            error!(payload, "JSON format error");
            return Err(CommandError::JsonFormat);
        }
    };

    let operation = match fields.get("operation") {
        Some(Value::String(op)) => op.to_lowercase(),
        Some(other) => {
            error!(operation = %other, "Operation is not a string");
            return Err(CommandError::Unknown(other.to_string()));
        }
        None => {
            error!("Keyword 'operation' missing");
            return Err(CommandError::NoOperation);
        }
    };

    let (name, arity) = match signature(&operation) {
        Some(sig) => sig,
        None => {
            error!(operation, "Command not recognized");
            return Err(CommandError::Unknown(operation));
        }
    };

    let mut args = [0u8; 4];
    for (slot, key) in args.iter_mut().zip(ARG_KEYS).take(arity) {
        *slot = fields
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| {
                error!(operation = name, key, "Wrong arguments");
                CommandError::WrongArgs(name)
            })?;
    }

    let command = build(name, args).ok_or_else(|| CommandError::Unknown(operation.clone()))?;
    debug!(?command, "Command decoded");
    Ok(command)
}

fn fold_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect()
}

/// Canonical name and argument count of `operation`.
fn signature(operation: &str) -> Option<(&'static str, usize)> {
    let sig = match operation {
        "store" => ("store", 2),
        "destore" => ("destore", 2),
        "rearrange" => ("rearrange", 4),
        "store_random" => ("store_random", 0),
        "destore_random" => ("destore_random", 0),
        "init_x" => ("init_x", 0),
        "init_y" => ("init_y", 0),
        "init_z" => ("init_z", 0),
        "show_occupancy" => ("show_occupancy", 0),
        "release" => ("release", 0),
        "shutdown" => ("shutdown", 0),
        _ => return None,
    };
    Some(sig)
}

fn build(name: &str, [x, z, x_new, z_new]: [u8; 4]) -> Option<Command> {
    let command = match name {
        "store" => Command::Store { x, z },
        "destore" => Command::Destore { x, z },
        "rearrange" => Command::Rearrange { x, z, x_new, z_new },
        "store_random" => Command::StoreRandom,
        "destore_random" => Command::DestoreRandom,
        "init_x" => Command::InitX,
        "init_y" => Command::InitY,
        "init_z" => Command::InitZ,
        "show_occupancy" => Command::ShowOccupancy,
        "release" => Command::Release,
        "shutdown" => Command::Shutdown,
        _ => return None,
    };
    Some(command)
}
