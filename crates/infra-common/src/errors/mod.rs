//! Error types for infrastructure helpers

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the infrastructure helpers
#[derive(Error, Debug)]
pub enum InfraError {
    /// Invalid or unparsable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The global logging subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, InfraError>;
