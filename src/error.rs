//! Host-side error types.
//!
//! Only faults of the host itself live here: configuration and logging
//! bootstrap problems. Anything that goes wrong while executing a script —
//! compilation, runtime errors, cancellation, unreadable script files — is
//! reported through [`ScriptResult`](crate::ScriptResult) instead and never
//! unwinds out of the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while bootstrapping the host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
