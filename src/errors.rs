//! Error types for the maintenance agent
//!
//! One enum per concern. The binary wraps them in `anyhow` only at the edge.

use std::path::PathBuf;

use action_primitives::ActionError;
use cdp_adapter::AdapterError;
use thiserror::Error;

/// Startup configuration failures. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{} file not found", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parse, type or validation failure; `message` names the field path.
    #[error("invalid config {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Failures inside one account's maintenance cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("couldn't get habitat name")]
    HabitatNameUnreadable,

    #[error("couldn't get upgrade button status for {building}")]
    ControlStatusUnreadable { building: String },

    #[error("expected a number for {what}, got {raw:?}")]
    UnparsableNumber { what: &'static str, raw: String },

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Failures opening or driving a browser session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("browser launch failed")]
    Launch(#[from] AdapterError),

    #[error("failed to create profile directory {}", path.display())]
    Profile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Action(#[from] ActionError),
}
