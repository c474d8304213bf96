use std::{fs, path::PathBuf};

use backup_display::{DateFormat, LoggingConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The backup list config.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// How backup dates are displayed.
    pub date: DateFormat,

    /// The logger config.
    pub logging: LoggingConfig,
}

impl Config {
    /// Tries to load a config from a toml file.
    pub fn load_toml(file_path: PathBuf) -> Result<Self, LoadConfigError> {
        if !file_path.exists() {
            return Err(LoadConfigError::NoFile);
        }

        let contents = fs::read_to_string(file_path).map_err(LoadConfigError::Read)?;
        let config = toml::from_str(&contents)?;

        Ok(config)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("The file does not exist.")]
    NoFile,

    #[error("Failed to read the file:\n{0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to deserialize the file:\n{0}")]
    Deserialize(#[from] toml::de::Error),
}
