//! # Arcade Infra-Common
//!
//! Shared infrastructure for the arcade crates:
//!
//! - [`logging`]: `tracing-subscriber` setup driven by [`logging::LoggingConfig`]
//! - [`config`]: helpers for loading TOML configuration files
//! - [`errors`]: the infrastructure error type
//!
//! Libraries in the workspace only emit `tracing` events; binaries call
//! [`logging::setup_logging`] once at startup.

pub mod config;
pub mod errors;
pub mod logging;

pub use errors::{InfraError, Result};
