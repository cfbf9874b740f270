//! Configuration loading helpers
//!
//! Components own their configuration structs; this module only knows how to
//! turn TOML text or files into any `Deserialize` type.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::errors::{InfraError, Result};

/// Parse a configuration value from TOML text
pub fn parse_toml_str<T: DeserializeOwned>(text: &str) -> Result<T> {
    toml::from_str(text).map_err(|e| InfraError::Config(e.to_string()))
}

/// Load a configuration value from a TOML file
pub fn load_toml_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| InfraError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Loaded configuration from {}", path.display());
    parse_toml_str(&text)
}
