//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod inspect;
pub mod process;

use std::path::{Path, PathBuf};

use firc_core::FircConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("firc")
        .join("config.json")
}

/// Load the configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FircConfig> {
    if let Some(path) = config_path {
        return Ok(FircConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        Ok(FircConfig::from_file(&path)?)
    } else {
        Ok(FircConfig::default())
    }
}
