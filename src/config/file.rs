//! Configuration file loading.

use std::path::Path;

use log::info;

use crate::error_handling::ConfigError;

use super::types::Config;

impl Config {
    /// Reads a JSON configuration file on top of the defaults.
    ///
    /// The result is not validated; callers apply any command-line overrides
    /// first and then call [`Config::validate`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if it is not a valid configuration document
    /// (including negative or non-numeric counts).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {}", path.display());
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
